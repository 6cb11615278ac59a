//! In-memory stats store.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::*;
use xbridge_types::Result;

/// In-memory stats store (the only backend; runs are not persisted).
pub struct MemoryStore {
    stats: Mutex<TxStats>,
    outcomes: Mutex<Vec<TransferOutcome>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(TxStats::default()),
            outcomes: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn record_outcome(&self, outcome: &TransferOutcome) -> Result<()> {
        self.stats.lock().unwrap().apply(outcome);
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }

    async fn stats(&self) -> Result<TxStats> {
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn list_outcomes(&self, wallet: Option<&str>) -> Result<Vec<TransferOutcome>> {
        let outcomes = self.outcomes.lock().unwrap();
        let filtered = outcomes
            .iter()
            .filter(|o| wallet.map_or(true, |name| o.wallet == name))
            .cloned()
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_filters_history() {
        let store = MemoryStore::new();
        store
            .record_outcome(&TransferOutcome::new("alice", 1, TransferStatus::ApprovalFailed))
            .await
            .unwrap();
        store
            .record_outcome(
                &TransferOutcome::new("bob", 1, TransferStatus::ApprovedAndSent).with_tx_hash("0x1"),
            )
            .await
            .unwrap();
        store
            .record_outcome(
                &TransferOutcome::new("bob", 1, TransferStatus::Confirmed)
                    .with_tx_hash("0x1")
                    .with_elapsed_ms(900),
            )
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!((stats.success, stats.failed, stats.pending), (1, 1, 0));
        assert_eq!(store.list_outcomes(None).await.unwrap().len(), 3);
        assert_eq!(store.list_outcomes(Some("bob")).await.unwrap().len(), 2);
        assert!(store.list_outcomes(Some("carol")).await.unwrap().is_empty());
    }
}
