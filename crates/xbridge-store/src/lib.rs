//! Run statistics for the dashboard.
//!
//! Defines the `StatsStore` trait that outcome sinks implement.
//! Provides a `MemoryStore`; nothing outlives the process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use xbridge_types::{Result, TransferOutcome, TransferStatus};

pub mod memory;

pub use memory::MemoryStore;

/// Number of recent timing samples kept for the performance chart.
pub const TIMING_WINDOW: usize = 30;

/// Success/failure/pending counters plus a rolling window of timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStats {
    pub success: u64,
    pub failed: u64,
    pub pending: u64,
    /// Oldest first, at most [`TIMING_WINDOW`] entries.
    pub recent_timings: Vec<u64>,
}

impl TxStats {
    /// Fold one outcome into the counters.
    pub fn apply(&mut self, outcome: &TransferOutcome) {
        match outcome.status {
            TransferStatus::ApprovedAndSent => self.pending += 1,
            TransferStatus::Confirmed => {
                self.pending = self.pending.saturating_sub(1);
                self.success += 1;
                self.push_timing(outcome.elapsed_ms);
            }
            TransferStatus::SendFailed => {
                // Only a broadcast transaction was counted as pending.
                if outcome.tx_hash.is_some() {
                    self.pending = self.pending.saturating_sub(1);
                }
                self.failed += 1;
                self.push_timing(outcome.elapsed_ms);
            }
            TransferStatus::ApprovalFailed => self.failed += 1,
            TransferStatus::RelayFound | TransferStatus::RelayTimeout => {}
        }
    }

    fn push_timing(&mut self, elapsed_ms: u64) {
        self.recent_timings.push(elapsed_ms);
        if self.recent_timings.len() > TIMING_WINDOW {
            let excess = self.recent_timings.len() - TIMING_WINDOW;
            self.recent_timings.drain(..excess);
        }
    }

    pub fn last_timing(&self) -> Option<u64> {
        self.recent_timings.last().copied()
    }

    pub fn average_timing(&self) -> Option<u64> {
        if self.recent_timings.is_empty() {
            return None;
        }
        Some(self.recent_timings.iter().sum::<u64>() / self.recent_timings.len() as u64)
    }
}

/// Sink for transfer outcomes.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn record_outcome(&self, outcome: &TransferOutcome) -> Result<()>;

    async fn stats(&self) -> Result<TxStats>;

    /// Outcome history, optionally filtered by wallet name.
    async fn list_outcomes(&self, wallet: Option<&str>) -> Result<Vec<TransferOutcome>>;
}
