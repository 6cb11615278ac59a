//! Bridge submitter: build, broadcast and confirm one `send` call.

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use xbridge_chain::{TokenBridgeChain, TransferInstruction, TransferRequest};
use xbridge_planner::scale_amount;
use xbridge_types::{BridgeError, Clock, Result, TransferStatus};
use xbridge_wallet::random_salt;

use crate::config::RunConfig;
use crate::events::{AttemptRef, RunReporter};

/// A confirmed bridge transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: TxHash,
    pub elapsed_ms: u64,
}

/// Encode the transfer operand: `abi.encode(address recipient, uint256 amount)`.
pub fn encode_transfer_operand(recipient: Address, amount: U256) -> Vec<u8> {
    (recipient, amount).abi_encode_params()
}

/// Submits transfer instructions to the bridge contract.
pub struct BridgeSubmitter {
    bridge: Address,
    decimals: u8,
    config: RunConfig,
    clock: Arc<dyn Clock>,
}

impl BridgeSubmitter {
    pub fn new(bridge: Address, decimals: u8, config: RunConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            bridge,
            decimals,
            config,
            clock,
        }
    }

    /// Build a request with a freshly generated salt.
    pub fn build_request(&self, recipient: Address, amount: U256) -> TransferRequest {
        TransferRequest {
            channel_id: self.config.channel_id,
            timeout_height: 0,
            timeout_timestamp: self.clock.now_unix_secs() + self.config.timeout_window_secs,
            salt: random_salt(),
            instruction: TransferInstruction {
                version: self.config.instruction_version,
                opcode: self.config.instruction_opcode,
                operand: encode_transfer_operand(recipient, amount).into(),
            },
        }
    }

    /// Send `amount` tokens to the wallet's own address on the destination chain.
    ///
    /// Records `ApprovedAndSent` once broadcast, then `Confirmed` or `SendFailed`.
    /// Failures are terminal for the attempt; nothing is retried.
    pub async fn submit(
        &self,
        chain: &dyn TokenBridgeChain,
        amount: &str,
        attempt: &AttemptRef,
        reporter: &RunReporter,
    ) -> Result<Submission> {
        let started = Instant::now();
        let mut broadcast: Option<TxHash> = None;

        let result = self
            .send_and_confirm(chain, amount, attempt, reporter, &mut broadcast)
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(tx_hash) => {
                info!(wallet = %attempt.wallet, attempt = attempt.number, %tx_hash, elapsed_ms, "bridge transfer confirmed");
                let outcome = attempt
                    .outcome(TransferStatus::Confirmed)
                    .with_tx_hash(tx_hash.to_string())
                    .with_elapsed_ms(elapsed_ms);
                reporter.record(&outcome).await;
                Ok(Submission {
                    tx_hash,
                    elapsed_ms,
                })
            }
            Err(e) => {
                warn!(wallet = %attempt.wallet, attempt = attempt.number, error = %e, elapsed_ms, "bridge transfer failed");
                let mut outcome = attempt
                    .outcome(TransferStatus::SendFailed)
                    .with_elapsed_ms(elapsed_ms)
                    .with_error(&e);
                if let Some(tx_hash) = broadcast {
                    outcome = outcome.with_tx_hash(tx_hash.to_string());
                }
                reporter.record(&outcome).await;
                Err(e)
            }
        }
    }

    async fn send_and_confirm(
        &self,
        chain: &dyn TokenBridgeChain,
        amount: &str,
        attempt: &AttemptRef,
        reporter: &RunReporter,
        broadcast: &mut Option<TxHash>,
    ) -> Result<TxHash> {
        let scaled =
            scale_amount(amount, self.decimals).map_err(|e| BridgeError::Submission(e.to_string()))?;
        let request = self.build_request(chain.owner(), scaled);

        reporter.loading("Initiating bridge transfer...");
        let tx_hash = chain.send(self.bridge, &request).await?;
        *broadcast = Some(tx_hash);

        reporter.loading(format!("Bridge transaction sent: {}", tx_hash));
        reporter
            .record(
                &attempt
                    .outcome(TransferStatus::ApprovedAndSent)
                    .with_tx_hash(tx_hash.to_string()),
            )
            .await;

        let status = chain
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| BridgeError::Submission(e.to_string()))?;
        if !status.is_success() {
            return Err(BridgeError::SubmissionFailed {
                tx_hash: tx_hash.to_string(),
            });
        }
        Ok(tx_hash)
    }
}
