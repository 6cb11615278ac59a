//! Attempt planning for a run.
//!
//! - Operator tx-count parsing (falls back to 1, saturates at `u32::MAX`)
//! - Random transfer amounts, scaled to token base units
//! - Randomized pauses between attempts of the same wallet

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use xbridge_types::{BridgeError, Result};

/// Amount and pacing bounds for generated attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptPolicy {
    /// Inclusive lower bound, in whole tokens.
    pub min_amount: f64,
    /// Exclusive upper bound, in whole tokens.
    pub max_amount: f64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            min_amount: 0.001,
            max_amount: 0.01,
            min_delay_ms: 3_000,
            max_delay_ms: 8_000,
        }
    }
}

impl AttemptPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_amount > 0.0 && self.min_amount <= self.max_amount) {
            return Err(BridgeError::Config(format!(
                "amount range [{}, {}) is invalid",
                self.min_amount, self.max_amount
            )));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(BridgeError::Config(format!(
                "delay range [{}, {}) is invalid",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

/// One planned transfer for a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAttempt {
    /// 1-based.
    pub number: u32,
    /// Decimal token amount with 6 fractional digits, e.g. "0.004321".
    pub amount: String,
    /// Pause after this attempt; `None` for the last one.
    pub delay_after: Option<Duration>,
}

/// Parse the operator's transactions-per-wallet answer.
///
/// Leading digits are honoured ("5x" is 5). Anything without leading digits,
/// or zero, falls back to 1. Counts past `u32::MAX` saturate.
pub fn parse_tx_count(input: &str) -> u32 {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return 1;
    }
    match digits.parse::<u32>() {
        Ok(0) => 1,
        Ok(n) => n,
        Err(_) => u32::MAX,
    }
}

/// Random amount in `[min_amount, max_amount)` rounded to 6 decimals.
pub fn random_amount<R: Rng + ?Sized>(rng: &mut R, policy: &AttemptPolicy) -> String {
    let value = if policy.max_amount > policy.min_amount {
        rng.gen_range(policy.min_amount..policy.max_amount)
    } else {
        policy.min_amount
    };
    format!("{:.6}", value)
}

/// Random pause in `[min_delay_ms, max_delay_ms)`.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, policy: &AttemptPolicy) -> Duration {
    let ms = if policy.max_delay_ms > policy.min_delay_ms {
        rng.gen_range(policy.min_delay_ms..policy.max_delay_ms)
    } else {
        policy.min_delay_ms
    };
    Duration::from_millis(ms)
}

/// Plan attempt `number` of `count` for one wallet.
pub fn plan_attempt<R: Rng + ?Sized>(
    rng: &mut R,
    number: u32,
    count: u32,
    policy: &AttemptPolicy,
) -> PlannedAttempt {
    PlannedAttempt {
        number,
        amount: random_amount(rng, policy),
        delay_after: (number < count).then(|| random_delay(rng, policy)),
    }
}

/// Lazily plan `count` attempts for one wallet.
pub fn plan_attempts<'a, R: Rng + ?Sized>(
    rng: &'a mut R,
    count: u32,
    policy: &'a AttemptPolicy,
) -> impl Iterator<Item = PlannedAttempt> + 'a {
    (1..=count).map(move |number| plan_attempt(&mut *rng, number, count, policy))
}

/// Scale a decimal token amount to base units.
pub fn scale_amount(amount: &str, decimals: u8) -> Result<U256> {
    parse_units(amount, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| BridgeError::Other(format!("invalid amount {}: {}", amount, e)))
}

/// Render base units as a decimal token amount.
pub fn format_amount(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}
