//! Salts for bridge `send` calls.
//!
//! The bridge derives packet identity from the salt, so a salt must never be
//! reused across submissions.

use alloy::primitives::B256;
use rand::RngCore;

/// Generate a fresh random 32-byte salt.
pub fn random_salt() -> B256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    B256::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_salts_are_distinct() {
        let salts: HashSet<B256> = (0..256).map(|_| random_salt()).collect();
        assert_eq!(salts.len(), 256);
        assert!(!salts.contains(&B256::ZERO));
    }
}
