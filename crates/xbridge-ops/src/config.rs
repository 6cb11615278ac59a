use serde::{Deserialize, Serialize};
use xbridge_chain::ChainConfig;
use xbridge_planner::AttemptPolicy;
use xbridge_types::Result;

/// Bridge call parameters.
///
/// The instruction tags are whatever the deployed bridge expects; they are
/// configuration rather than protocol constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub channel_id: u32,
    pub instruction_version: u8,
    pub instruction_opcode: u8,
    /// Added to the current time to form the packet timeout timestamp.
    pub timeout_window_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            channel_id: 1,
            instruction_version: 1,
            instruction_opcode: 2,
            timeout_window_secs: 3_600,
        }
    }
}

/// Everything the run engine needs to know about the route and pacing.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub chain: ChainConfig,
    pub run: RunConfig,
    pub attempts: AttemptPolicy,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.chain.validate()?;
        self.attempts.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_defaults() {
        let config: RunConfig = toml::from_str("channel_id = 7").unwrap();
        assert_eq!(config.channel_id, 7);
        assert_eq!(config.instruction_version, 1);
        assert_eq!(config.instruction_opcode, 2);
        assert_eq!(config.timeout_window_secs, 3_600);
    }

    #[test]
    fn test_engine_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let mut config = EngineConfig::default();
        config.chain.rpc_urls.clear();
        assert!(config.validate().is_err());
    }
}
