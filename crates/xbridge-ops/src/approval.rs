//! Approval gate: make sure the bridge may move the wallet's tokens.

use alloy::primitives::{Address, TxHash, U256};
use tracing::info;
use xbridge_chain::TokenBridgeChain;
use xbridge_planner::format_amount;
use xbridge_types::{BridgeError, Result};

use crate::events::RunReporter;

/// How the allowance requirement was met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    AlreadySufficient,
    Approved { tx_hash: TxHash },
}

/// Checks balance and allowance of one token towards one spender.
#[derive(Debug, Clone)]
pub struct ApprovalGate {
    token: Address,
    spender: Address,
    decimals: u8,
}

impl ApprovalGate {
    pub fn new(token: Address, spender: Address, decimals: u8) -> Self {
        Self {
            token,
            spender,
            decimals,
        }
    }

    /// Ensure `allowance >= balance`, approving `U256::MAX` if needed.
    ///
    /// Issues at most one transaction. A zero balance fails before any
    /// transaction is sent.
    pub async fn ensure(
        &self,
        chain: &dyn TokenBridgeChain,
        reporter: &RunReporter,
    ) -> Result<Approval> {
        let owner = chain.owner();

        let balance = chain.balance_of(self.token, owner).await?;
        if balance.is_zero() {
            return Err(BridgeError::InsufficientFunds {
                address: owner.to_string(),
            });
        }
        reporter.info(format!(
            "Wallet {} has {} tokens",
            owner,
            format_amount(balance, self.decimals)
        ));

        let allowance = chain.allowance(self.token, owner, self.spender).await?;
        if allowance >= balance {
            reporter.success("Token approval already sufficient");
            return Ok(Approval::AlreadySufficient);
        }

        reporter.loading("Approving tokens for bridge...");
        let tx_hash = chain.approve(self.token, self.spender, U256::MAX).await?;
        reporter.loading(format!("Approval transaction sent: {}", tx_hash));

        let status = chain.wait_for_receipt(tx_hash).await?;
        if !status.is_success() {
            return Err(BridgeError::ApprovalRejected {
                tx_hash: tx_hash.to_string(),
            });
        }

        info!(%owner, %tx_hash, spender = %self.spender, "allowance approved");
        reporter.success("Approval successful!");
        Ok(Approval::Approved { tx_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use std::sync::Arc;
    use xbridge_chain::ReceiptStatus;
    use xbridge_store::MemoryStore;

    fn gate() -> ApprovalGate {
        ApprovalGate::new(MockChain::TOKEN, MockChain::BRIDGE, 18)
    }

    fn reporter() -> RunReporter {
        RunReporter::new(Arc::new(MemoryStore::new()), None)
    }

    #[tokio::test]
    async fn test_zero_balance_issues_no_transaction() {
        let chain = MockChain::new().with_balance(U256::ZERO);

        let result = gate().ensure(&chain, &reporter()).await;

        assert!(matches!(result, Err(BridgeError::InsufficientFunds { .. })));
        assert_eq!(chain.transactions_sent(), 0);
    }

    #[tokio::test]
    async fn test_sufficient_allowance_issues_no_transaction() {
        let chain = MockChain::new()
            .with_balance(MockChain::tokens(10))
            .with_allowance(MockChain::tokens(10));

        let result = gate().ensure(&chain, &reporter()).await.unwrap();

        assert_eq!(result, Approval::AlreadySufficient);
        assert_eq!(chain.transactions_sent(), 0);
    }

    #[tokio::test]
    async fn test_low_allowance_approves_max() {
        let chain = MockChain::new()
            .with_balance(MockChain::tokens(10))
            .with_allowance(MockChain::tokens(1));

        let result = gate().ensure(&chain, &reporter()).await.unwrap();

        assert!(matches!(result, Approval::Approved { .. }));
        assert_eq!(
            chain.approvals(),
            vec![(MockChain::TOKEN, MockChain::BRIDGE, U256::MAX)]
        );
        assert_eq!(chain.transactions_sent(), 1);
    }

    #[tokio::test]
    async fn test_reverted_approval_is_rejected() {
        let chain = MockChain::new()
            .with_balance(MockChain::tokens(10))
            .with_approve_status(ReceiptStatus::Reverted);

        let result = gate().ensure(&chain, &reporter()).await;

        assert!(matches!(result, Err(BridgeError::ApprovalRejected { .. })));
        assert_eq!(chain.transactions_sent(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let chain = MockChain::new().with_failing_reads();

        let result = gate().ensure(&chain, &reporter()).await;

        assert!(matches!(result, Err(BridgeError::Rpc(_))));
        assert_eq!(chain.transactions_sent(), 0);
    }
}
