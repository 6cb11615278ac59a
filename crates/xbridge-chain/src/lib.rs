//! Source-chain access for the bridge bot.
//!
//! - Token reads (balance, allowance) and approvals
//! - Bridge `send` submission
//! - Receipt waiting

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use xbridge_types::Result;

pub mod config;
pub mod contracts;
pub mod rpc_client;

pub use config::ChainConfig;
pub use rpc_client::RpcChainClient;

/// Instruction carried by a bridge packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub version: u8,
    pub opcode: u8,
    pub operand: Bytes,
}

/// Arguments of a single bridge `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub channel_id: u32,
    /// Block-height timeout; 0 disables it.
    pub timeout_height: u64,
    /// Unix-seconds timeout.
    pub timeout_timestamp: u64,
    pub salt: B256,
    pub instruction: TransferInstruction,
}

/// Receipt status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

impl ReceiptStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ReceiptStatus::Success)
    }
}

impl From<bool> for ReceiptStatus {
    fn from(status: bool) -> Self {
        if status {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Reverted
        }
    }
}

/// Signed access to one chain on behalf of one wallet.
///
/// Write methods return once the transaction is broadcast; use
/// [`TokenBridgeChain::wait_for_receipt`] to wait for it to be mined.
#[async_trait]
pub trait TokenBridgeChain: Send + Sync {
    /// Address of the signing wallet.
    fn owner(&self) -> Address;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    async fn send(&self, bridge: Address, request: &TransferRequest) -> Result<TxHash>;

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptStatus>;
}
