//! Wallet store loading and per-attempt randomness.
//!
//! - `store`: parse `wallet.json` into signing wallets
//! - `salt`: fresh 32-byte salts for bridge submissions

pub mod salt;
pub mod store;

pub use salt::random_salt;
pub use store::{load_wallets, parse_wallets, Wallet, WalletEntry, WalletFile, EXPECTED_SHAPE};
