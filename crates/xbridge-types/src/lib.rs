use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod clock;

pub use clock::{Clock, ManualClock, TokioClock};

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Bridge bot error types.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to load wallets: {0}")]
    Load(String),

    #[error("no tokens found in wallet {address}")]
    InsufficientFunds { address: String },

    #[error("approval transaction {tx_hash} reverted")]
    ApprovalRejected { tx_hash: Hex },

    #[error("bridge transaction {tx_hash} reverted")]
    SubmissionFailed { tx_hash: Hex },

    #[error("bridge submission error: {0}")]
    Submission(String),

    #[error("packet hash not found after {attempts} attempts for {tx_hash}")]
    RelayNotFound { tx_hash: Hex, attempts: u32 },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("relay index error: {0}")]
    Relay(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Lifecycle status of a single transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferStatus {
    /// Bridge transaction broadcast, receipt not yet seen.
    ApprovedAndSent,
    ApprovalFailed,
    SendFailed,
    /// Receipt reported success; relay polling follows.
    Confirmed,
    RelayFound,
    RelayTimeout,
}

impl TransferStatus {
    /// Whether the bridge transaction landed successfully on the source chain.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TransferStatus::Confirmed | TransferStatus::RelayFound | TransferStatus::RelayTimeout
        )
    }
}

/// Outcome of one step of a transfer attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub wallet: String,
    /// 1-based attempt number within the wallet.
    pub attempt: u32,
    pub status: TransferStatus,
    pub tx_hash: Option<Hex>,
    pub packet_hash: Option<Hex>,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

impl TransferOutcome {
    pub fn new(wallet: &str, attempt: u32, status: TransferStatus) -> Self {
        Self {
            wallet: wallet.to_string(),
            attempt,
            status,
            tx_hash: None,
            packet_hash: None,
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<Hex>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    pub fn with_packet_hash(mut self, packet_hash: impl Into<Hex>) -> Self {
        self.packet_hash = Some(packet_hash.into());
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn with_error(mut self, error: &BridgeError) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Prefix a transaction hash with "0x" when it is missing.
pub fn normalize_tx_hash(tx_hash: &str) -> Hex {
    let trimmed = tx_hash.trim();
    if trimmed.starts_with("0x") {
        trimmed.to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

/// Shorten an address for table display: "0x1234...abcd".
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
