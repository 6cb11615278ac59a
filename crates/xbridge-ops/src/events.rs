//! Run events and the reporter that fans them out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use xbridge_store::StatsStore;
use xbridge_types::{TransferOutcome, TransferStatus};

/// Severity tag of a dashboard log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
    Loading,
    Step,
}

/// Per-attempt state machine.
///
/// `Idle → Approving → Submitting → Confirmed | Failed → Polling → Done`.
/// `Polling` only follows `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptState {
    Idle,
    Approving,
    Submitting,
    Confirmed,
    Failed,
    Polling,
    Done,
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub wallets: usize,
    pub attempts: u32,
    pub success: u32,
    pub failed: u32,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        self.attempts += 1;
        if outcome.status.is_success() {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} successful, {} failed", self.success, self.failed)
    }
}

/// Event emitted by the run engine.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Log { level: LogLevel, message: String },
    State { wallet: String, attempt: u32, state: AttemptState },
    Outcome(TransferOutcome),
    Finished(RunSummary),
}

/// Callback type for run events.
pub type RunEventHandler = Box<dyn Fn(RunEvent) + Send + Sync>;

/// Identifies the attempt an outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRef {
    pub wallet: String,
    /// 1-based.
    pub number: u32,
}

impl AttemptRef {
    pub fn new(wallet: &str, number: u32) -> Self {
        Self {
            wallet: wallet.to_string(),
            number,
        }
    }

    pub fn outcome(&self, status: TransferStatus) -> TransferOutcome {
        TransferOutcome::new(&self.wallet, self.number, status)
    }
}

/// Sends log lines to the observer and outcomes to both the store and the observer.
pub struct RunReporter {
    store: Arc<dyn StatsStore>,
    on_event: Option<RunEventHandler>,
}

impl RunReporter {
    pub fn new(store: Arc<dyn StatsStore>, on_event: Option<RunEventHandler>) -> Self {
        Self { store, on_event }
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(ref handler) = self.on_event {
            handler(event);
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(RunEvent::Log {
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn loading(&self, message: impl Into<String>) {
        self.log(LogLevel::Loading, message);
    }

    pub fn step(&self, message: impl Into<String>) {
        self.log(LogLevel::Step, message);
    }

    pub fn state(&self, attempt: &AttemptRef, state: AttemptState) {
        self.emit(RunEvent::State {
            wallet: attempt.wallet.clone(),
            attempt: attempt.number,
            state,
        });
    }

    /// Record an outcome in the store, then notify the observer.
    ///
    /// Store failures are logged, never propagated.
    pub async fn record(&self, outcome: &TransferOutcome) {
        if let Err(e) = self.store.record_outcome(outcome).await {
            warn!(error = %e, wallet = %outcome.wallet, "failed to record outcome");
        }
        self.emit(RunEvent::Outcome(outcome.clone()));
    }
}
