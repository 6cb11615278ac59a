use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use xbridge_chain::ChainConfig;
use xbridge_ops::{EngineConfig, RunConfig};
use xbridge_planner::AttemptPolicy;
use xbridge_relay::RelayConfig;

/// Contents of the optional TOML config file.
///
/// Every section and field falls back to the built-in testnet values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chain: ChainConfig,
    pub relay: RelayConfig,
    pub run: RunConfig,
    pub attempts: AttemptPolicy,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).wrap_err("invalid config file")
    }

    pub fn with_rpc_index(mut self, rpc_index: Option<usize>) -> Self {
        if let Some(index) = rpc_index {
            self.chain.rpc_index = index;
        }
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            chain: self.chain.clone(),
            run: self.run.clone(),
            attempts: self.attempts.clone(),
        }
    }
}
