//! Cross-chain relay tracking.
//!
//! After a bridge transaction is mined, the packet it produced shows up in
//! the Union index once relayers pick it up. The poller asks the index at a
//! fixed interval until a packet hash appears or the attempt ceiling is hit.
//! Not finding one is an expected outcome, not an error.

pub mod index_client;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use xbridge_types::{normalize_tx_hash, BridgeError, Clock, Hex, Result};

pub use index_client::{PacketIndex, PacketIndexClient};

/// Relay poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub graphql_url: String,
    /// Sent as `origin`/`referer` headers.
    pub origin: String,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub packet_explorer_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://graphql.union.build/v2.5/graphql".into(),
            origin: "https://app.union.build".into(),
            max_attempts: 50,
            poll_interval_ms: 5_000,
            request_timeout_ms: 20_000,
            packet_explorer_url: "https://app.union.build/explorer".into(),
        }
    }
}

impl RelayConfig {
    pub fn packet_url(&self, packet_hash: &str) -> String {
        format!(
            "{}/transfers/{}",
            self.packet_explorer_url.trim_end_matches('/'),
            packet_hash
        )
    }
}

/// Progress of a single polling run.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    QueryFailed { attempt: u32, message: String },
    Found { packet_hash: Hex, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Result of polling the index for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Found { packet_hash: Hex, attempts: u32 },
    NotFound { attempts: u32 },
}

impl PollOutcome {
    pub fn packet_hash(&self) -> Option<&str> {
        match self {
            PollOutcome::Found { packet_hash, .. } => Some(packet_hash),
            PollOutcome::NotFound { .. } => None,
        }
    }

    /// Convert a miss into [`BridgeError::RelayNotFound`] for reporting.
    pub fn into_result(self, tx_hash: &str) -> Result<Hex> {
        match self {
            PollOutcome::Found { packet_hash, .. } => Ok(packet_hash),
            PollOutcome::NotFound { attempts } => Err(BridgeError::RelayNotFound {
                tx_hash: normalize_tx_hash(tx_hash),
                attempts,
            }),
        }
    }
}

/// Polls the packet index with bounded retries and a fixed interval.
pub struct RelayPoller {
    config: RelayConfig,
    index: Arc<dyn PacketIndex>,
    clock: Arc<dyn Clock>,
}

impl RelayPoller {
    pub fn new(config: RelayConfig, index: Arc<dyn PacketIndex>, clock: Arc<dyn Clock>) -> Self {
        Self { config, index, clock }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Poll until a packet hash shows up or `max_attempts` queries have been made.
    ///
    /// Query errors count as a missed poll. There is no sleep after the final attempt.
    pub async fn wait_for_packet_hash(
        &self,
        tx_hash: &str,
        on_event: &(dyn Fn(RelayEvent) + Send + Sync),
    ) -> PollOutcome {
        let tx_hash = normalize_tx_hash(tx_hash);
        let max_attempts = self.config.max_attempts;
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=max_attempts {
            match self.index.find_packet_hash(&tx_hash).await {
                Ok(Some(packet_hash)) => {
                    debug!(%tx_hash, %packet_hash, attempt, "packet hash found");
                    on_event(RelayEvent::Found {
                        packet_hash: packet_hash.clone(),
                        attempts: attempt,
                    });
                    return PollOutcome::Found {
                        packet_hash,
                        attempts: attempt,
                    };
                }
                Ok(None) => {
                    debug!(%tx_hash, attempt, max_attempts, "packet not indexed yet");
                }
                Err(e) => {
                    warn!(%tx_hash, attempt, error = %e, "packet index query failed");
                    on_event(RelayEvent::QueryFailed {
                        attempt,
                        message: e.to_string(),
                    });
                }
            }

            if attempt < max_attempts {
                self.clock.sleep(interval).await;
            }
        }

        on_event(RelayEvent::Exhausted {
            attempts: max_attempts,
        });
        PollOutcome::NotFound {
            attempts: max_attempts,
        }
    }
}
