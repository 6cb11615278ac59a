//! GraphQL client for the Union packet index.
//!
//! Query:
//! - `v2_5_transfers(args: {p_transaction_hash})` → `[{ packet_hash }]`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use xbridge_types::{BridgeError, Hex, Result};

use crate::RelayConfig;

const TRANSFERS_QUERY: &str = r#"
query ($submission_tx_hash: String!) {
  v2_5_transfers(args: {p_transaction_hash: $submission_tx_hash}) {
    packet_hash
  }
}
"#;

/// Lookup of the packet hash correlated with a source-chain transaction.
#[async_trait]
pub trait PacketIndex: Send + Sync {
    /// `Ok(None)` when the index has no record yet.
    async fn find_packet_hash(&self, tx_hash: &str) -> Result<Option<Hex>>;
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: TransferVariables<'a>,
}

#[derive(Debug, Serialize)]
struct TransferVariables<'a> {
    submission_tx_hash: &'a str,
}

/// GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransfersData {
    #[serde(default)]
    pub v2_5_transfers: Option<Vec<TransferRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub packet_hash: Option<Hex>,
}

/// Extract the first non-empty packet hash from a raw response body.
pub fn parse_packet_hash(body: &str) -> Result<Option<Hex>> {
    let response: GraphqlResponse<TransfersData> = serde_json::from_str(body)
        .map_err(|e| BridgeError::Relay(format!("failed to parse index response: {}", e)))?;

    if let Some(errors) = response.errors.filter(|errs| !errs.is_empty()) {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(BridgeError::Relay(messages.join("; ")));
    }

    Ok(response
        .data
        .and_then(|data| data.v2_5_transfers)
        .and_then(|records| records.into_iter().next())
        .and_then(|record| record.packet_hash)
        .filter(|hash| !hash.is_empty()))
}

/// HTTP client for the packet index.
pub struct PacketIndexClient {
    endpoint: String,
    origin: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl PacketIndexClient {
    pub fn new(config: &RelayConfig) -> Self {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        Self {
            endpoint: config.graphql_url.clone(),
            origin: config.origin.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }
}

#[async_trait]
impl PacketIndex for PacketIndexClient {
    async fn find_packet_hash(&self, tx_hash: &str) -> Result<Option<Hex>> {
        let request = GraphqlRequest {
            query: TRANSFERS_QUERY,
            variables: TransferVariables {
                submission_tx_hash: tx_hash,
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/graphql-response+json, application/json")
            .header("accept-language", "en-US,en;q=0.9")
            .header("origin", &self.origin)
            .header("referer", format!("{}/", self.origin))
            .header("user-agent", "Mozilla/5.0")
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BridgeError::Relay(format!("index request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BridgeError::Relay(format!(
                "index returned status {}: {}",
                status, body
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| BridgeError::Relay(format!("failed to read index response: {}", e)))?;

        let packet_hash = parse_packet_hash(&body)?;
        debug!(tx_hash, found = packet_hash.is_some(), "packet index queried");
        Ok(packet_hash)
    }
}
