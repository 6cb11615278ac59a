//! Sequential run orchestration.
//!
//! Wallets are processed in order and attempts within a wallet run one at a
//! time: approve, submit, then poll the relay. A failed attempt is reported
//! and the run moves on to the next one. Randomized pauses separate attempts
//! of the same wallet; there is none after the last.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;
use xbridge_chain::TokenBridgeChain;
use xbridge_planner::{plan_attempts, PlannedAttempt};
use xbridge_relay::{RelayEvent, RelayPoller};
use xbridge_store::StatsStore;
use xbridge_types::{BridgeError, Clock, TransferOutcome, TransferStatus};

use crate::approval::ApprovalGate;
use crate::config::EngineConfig;
use crate::events::{AttemptRef, AttemptState, RunEvent, RunEventHandler, RunReporter, RunSummary};
use crate::submitter::BridgeSubmitter;

/// A wallet taking part in a run, with its signed chain access.
#[derive(Clone)]
pub struct RunWallet {
    pub name: String,
    pub chain: Arc<dyn TokenBridgeChain>,
}

impl RunWallet {
    pub fn new(name: impl Into<String>, chain: Arc<dyn TokenBridgeChain>) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }
}

pub struct RunEngine {
    config: EngineConfig,
    gate: ApprovalGate,
    submitter: BridgeSubmitter,
    poller: RelayPoller,
    reporter: RunReporter,
    clock: Arc<dyn Clock>,
}

impl RunEngine {
    pub fn new(
        config: EngineConfig,
        poller: RelayPoller,
        store: Arc<dyn StatsStore>,
        clock: Arc<dyn Clock>,
        on_event: Option<RunEventHandler>,
    ) -> Self {
        let chain = &config.chain;
        let gate = ApprovalGate::new(chain.token_address, chain.bridge_address, chain.token_decimals);
        let submitter = BridgeSubmitter::new(
            chain.bridge_address,
            chain.token_decimals,
            config.run.clone(),
            clock.clone(),
        );
        Self {
            gate,
            submitter,
            poller,
            reporter: RunReporter::new(store, on_event),
            clock,
            config,
        }
    }

    /// Run `tx_count` attempts for every wallet, in order.
    pub async fn run(&self, wallets: &[RunWallet], tx_count: u32) -> RunSummary {
        let mut summary = RunSummary {
            wallets: wallets.len(),
            ..Default::default()
        };
        info!(wallets = wallets.len(), tx_count, "starting run");
        self.reporter
            .info(format!("Will perform {} transactions per wallet", tx_count));

        for wallet in wallets {
            self.reporter
                .step(format!("Processing wallet: {}", wallet.name));

            let mut rng = StdRng::from_entropy();
            for planned in plan_attempts(&mut rng, tx_count, &self.config.attempts) {
                self.reporter
                    .step(format!("Transaction {}/{}", planned.number, tx_count));

                let outcome = self.run_attempt(wallet, &planned).await;
                summary.record(&outcome);

                if let Some(delay) = planned.delay_after {
                    self.reporter.info(format!(
                        "Waiting {}ms before next transaction...",
                        delay.as_millis()
                    ));
                    self.clock.sleep(delay).await;
                }
            }
        }

        info!(%summary, "run finished");
        self.reporter.success("All transactions completed!");
        self.reporter.info(format!("Summary: {}", summary));
        self.reporter.emit(RunEvent::Finished(summary));
        summary
    }

    /// Drive one attempt to a terminal outcome.
    async fn run_attempt(&self, wallet: &RunWallet, planned: &PlannedAttempt) -> TransferOutcome {
        let attempt = AttemptRef::new(&wallet.name, planned.number);
        let chain = wallet.chain.as_ref();

        self.reporter.info(format!("Amount: {} tokens", planned.amount));
        self.reporter.state(&attempt, AttemptState::Approving);

        if let Err(e) = self.gate.ensure(chain, &self.reporter).await {
            self.reporter.error(approval_message(&e));
            let outcome = attempt.outcome(TransferStatus::ApprovalFailed).with_error(&e);
            self.reporter.record(&outcome).await;
            self.fail(&attempt);
            return outcome;
        }

        self.reporter.state(&attempt, AttemptState::Submitting);
        let submission = match self
            .submitter
            .submit(chain, &planned.amount, &attempt, &self.reporter)
            .await
        {
            Ok(submission) => submission,
            Err(e) => {
                self.reporter.error(submission_message(&e));
                self.fail(&attempt);
                return attempt.outcome(TransferStatus::SendFailed).with_error(&e);
            }
        };

        let tx_hash = submission.tx_hash.to_string();
        self.reporter.state(&attempt, AttemptState::Confirmed);
        self.reporter.success(format!(
            "Bridge successful! Time: {}ms",
            submission.elapsed_ms
        ));
        self.reporter.info(format!("Transaction hash: {}", tx_hash));
        self.reporter
            .info(format!("Explorer: {}", self.config.chain.tx_url(&tx_hash)));

        self.reporter.state(&attempt, AttemptState::Polling);
        self.reporter.loading("Polling for packet hash...");
        let poll = self
            .poller
            .wait_for_packet_hash(&tx_hash, &|event: RelayEvent| {
                if let RelayEvent::QueryFailed { message, .. } = event {
                    self.reporter.error(format!("Packet error: {}", message));
                }
            })
            .await;

        let outcome = match poll.into_result(&tx_hash) {
            Ok(packet_hash) => {
                self.reporter
                    .success(format!("Packet hash found: {}", packet_hash));
                self.reporter.info(format!(
                    "Union explorer: {}",
                    self.poller.config().packet_url(&packet_hash)
                ));
                attempt
                    .outcome(TransferStatus::RelayFound)
                    .with_packet_hash(packet_hash)
            }
            Err(e) => {
                self.reporter.warn(e.to_string());
                attempt.outcome(TransferStatus::RelayTimeout).with_error(&e)
            }
        }
        .with_tx_hash(tx_hash)
        .with_elapsed_ms(submission.elapsed_ms);

        self.reporter.record(&outcome).await;
        self.reporter.state(&attempt, AttemptState::Done);
        outcome
    }

    fn fail(&self, attempt: &AttemptRef) {
        self.reporter.state(attempt, AttemptState::Failed);
        self.reporter.state(attempt, AttemptState::Done);
    }
}

fn approval_message(e: &BridgeError) -> String {
    match e {
        BridgeError::InsufficientFunds { .. } => e.to_string(),
        _ => format!("Approval failed: {}", e),
    }
}

fn submission_message(e: &BridgeError) -> String {
    match e {
        BridgeError::SubmissionFailed { .. } => "Bridge failed!".to_string(),
        _ => format!("Bridge error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockChain, MockIndex};
    use std::sync::Mutex;
    use std::time::Duration;
    use xbridge_chain::ReceiptStatus;
    use xbridge_relay::{PacketIndex, RelayConfig};
    use xbridge_store::MemoryStore;
    use xbridge_types::ManualClock;

    struct Harness {
        engine: RunEngine,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        events: Arc<Mutex<Vec<RunEvent>>>,
    }

    impl Harness {
        fn new(index: Arc<dyn PacketIndex>, relay: RelayConfig) -> Self {
            let store = Arc::new(MemoryStore::new());
            let clock = Arc::new(ManualClock::default());
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = events.clone();
            let poller = RelayPoller::new(relay, index, clock.clone());
            let engine = RunEngine::new(
                EngineConfig::default(),
                poller,
                store.clone(),
                clock.clone(),
                Some(Box::new(move |e| sink.lock().unwrap().push(e))),
            );
            Self {
                engine,
                store,
                clock,
                events,
            }
        }

        fn quick(index: Arc<dyn PacketIndex>) -> Self {
            Self::new(
                index,
                RelayConfig {
                    max_attempts: 2,
                    poll_interval_ms: 5_000,
                    ..Default::default()
                },
            )
        }

        fn states(&self, wallet: &str, number: u32) -> Vec<AttemptState> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    RunEvent::State {
                        wallet: w,
                        attempt,
                        state,
                    } if w == wallet && *attempt == number => Some(*state),
                    _ => None,
                })
                .collect()
        }

        fn messages(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    RunEvent::Log { message, .. } => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    fn funded() -> Arc<MockChain> {
        Arc::new(MockChain::new().with_balance(MockChain::tokens(10)))
    }

    #[tokio::test]
    async fn test_single_wallet_end_to_end() {
        let chain = funded();
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![RunWallet::new("alice", chain.clone())];

        let summary = harness.engine.run(&wallets, 1).await;

        assert_eq!((summary.attempts, summary.success, summary.failed), (1, 1, 0));
        assert_eq!(chain.approvals().len(), 1);
        assert_eq!(chain.sends().len(), 1);

        let stats = harness.store.stats().await.unwrap();
        assert_eq!((stats.success, stats.failed, stats.pending), (1, 0, 0));
        assert_eq!(stats.recent_timings.len(), 1);

        let history = harness.store.list_outcomes(Some("alice")).await.unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.status, TransferStatus::RelayFound);
        assert!(last.packet_hash.as_deref().unwrap().ends_with("feed"));
        assert!(harness.clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_success_state_sequence() {
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![RunWallet::new("alice", funded())];

        harness.engine.run(&wallets, 1).await;

        assert_eq!(
            harness.states("alice", 1),
            vec![
                AttemptState::Approving,
                AttemptState::Submitting,
                AttemptState::Confirmed,
                AttemptState::Polling,
                AttemptState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_timeout_still_counts_as_success() {
        let index = Arc::new(MockIndex::never());
        let harness = Harness::quick(index.clone());
        let wallets = vec![RunWallet::new("alice", funded())];

        let summary = harness.engine.run(&wallets, 1).await;

        assert_eq!((summary.success, summary.failed), (1, 0));
        assert_eq!(index.queries(), 2);
        let history = harness.store.list_outcomes(None).await.unwrap();
        assert_eq!(history.last().unwrap().status, TransferStatus::RelayTimeout);
        assert_eq!(harness.clock.sleeps(), vec![Duration::from_secs(5)]);
        assert!(harness
            .messages()
            .iter()
            .any(|m| m.starts_with("packet hash not found after 2 attempts")));
    }

    #[tokio::test]
    async fn test_pauses_only_between_attempts() {
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![
            RunWallet::new("alice", funded()),
            RunWallet::new("bob", funded()),
        ];

        let summary = harness.engine.run(&wallets, 3).await;

        assert_eq!(summary.attempts, 6);
        let sleeps = harness.clock.sleeps();
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps
            .iter()
            .all(|d| *d >= Duration::from_secs(3) && *d < Duration::from_secs(8)));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_run() {
        let broke = Arc::new(MockChain::new());
        let reverting = Arc::new(
            MockChain::new()
                .with_balance(MockChain::tokens(10))
                .with_send_status(ReceiptStatus::Reverted),
        );
        let healthy = funded();
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![
            RunWallet::new("broke", broke.clone()),
            RunWallet::new("reverting", reverting.clone()),
            RunWallet::new("healthy", healthy.clone()),
        ];

        let summary = harness.engine.run(&wallets, 2).await;

        assert_eq!(summary.wallets, 3);
        assert_eq!((summary.attempts, summary.success, summary.failed), (6, 2, 4));
        assert_eq!(broke.transactions_sent(), 0);
        assert_eq!(reverting.sends().len(), 2);
        assert_eq!(healthy.sends().len(), 2);

        assert_eq!(
            harness.states("broke", 1),
            vec![AttemptState::Approving, AttemptState::Failed, AttemptState::Done]
        );

        let stats = harness.store.stats().await.unwrap();
        assert_eq!((stats.success, stats.failed, stats.pending), (2, 4, 0));
    }

    #[tokio::test]
    async fn test_approval_happens_once_per_wallet() {
        let chain = funded();
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![RunWallet::new("alice", chain.clone())];

        harness.engine.run(&wallets, 3).await;

        assert_eq!(chain.approvals().len(), 1);
        assert_eq!(chain.sends().len(), 3);
    }

    #[tokio::test]
    async fn test_finish_reports_summary() {
        let harness = Harness::quick(Arc::new(MockIndex::found_on(1)));
        let wallets = vec![RunWallet::new("alice", funded())];

        harness.engine.run(&wallets, 1).await;

        let messages = harness.messages();
        assert!(messages.contains(&"Processing wallet: alice".to_string()));
        assert!(messages.contains(&"Transaction 1/1".to_string()));
        assert!(messages.contains(&"All transactions completed!".to_string()));
        assert!(messages.contains(&"Summary: 1 successful, 0 failed".to_string()));
        assert!(matches!(
            harness.events.lock().unwrap().last(),
            Some(RunEvent::Finished(s)) if s.success == 1
        ));
    }
}
