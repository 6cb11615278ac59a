//! High-level bridge farming operations.
//!
//! Wires the approval gate, the bridge submitter and the relay poller into
//! a sequential run over all configured wallets.

pub mod approval;
pub mod config;
pub mod engine;
pub mod events;
pub mod submitter;

#[cfg(test)]
mod mock;

pub use approval::{Approval, ApprovalGate};
pub use config::{EngineConfig, RunConfig};
pub use engine::{RunEngine, RunWallet};
pub use events::{
    AttemptRef, AttemptState, LogLevel, RunEvent, RunEventHandler, RunReporter, RunSummary,
};
pub use submitter::{encode_transfer_operand, BridgeSubmitter, Submission};
