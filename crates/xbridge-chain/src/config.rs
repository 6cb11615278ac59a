use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use xbridge_types::{BridgeError, Result};

/// Source chain configuration.
///
/// `rpc_index` selects one endpoint for the whole run; there is no rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub name: String,
    /// Display name of the destination chain.
    pub destination: String,
    pub chain_id: u64,
    pub rpc_urls: Vec<String>,
    pub rpc_index: usize,
    pub token_address: Address,
    pub bridge_address: Address,
    pub token_decimals: u8,
    pub explorer_url: String,
    /// Give up waiting for a receipt after this long. Unset waits until mined.
    pub receipt_timeout_secs: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "Babylon Testnet".into(),
            destination: "Xion Testnet".into(),
            chain_id: 13_371_337,
            rpc_urls: vec![
                "https://rpc.babylon-testnet.io".into(),
                "https://rpc.xion-testnet.io".into(),
            ],
            rpc_index: 0,
            token_address: address!("0x4B5DF730C2e6b28E17013A1485E5d9BC41Efe021"),
            bridge_address: address!("0x7B5Fe22B5446f7C62Ea27B8BD71CeF94e03f3dF2"),
            token_decimals: 18,
            explorer_url: "https://explorer.babylon-testnet.io".into(),
            receipt_timeout_secs: None,
        }
    }
}

impl ChainConfig {
    /// The endpoint selected by `rpc_index`.
    pub fn active_rpc_url(&self) -> Result<&str> {
        self.rpc_urls
            .get(self.rpc_index)
            .map(String::as_str)
            .ok_or_else(|| {
                BridgeError::Config(format!(
                    "rpc_index {} out of range ({} endpoints)",
                    self.rpc_index,
                    self.rpc_urls.len()
                ))
            })
    }

    pub fn validate(&self) -> Result<()> {
        self.active_rpc_url()?;
        if self.token_decimals > 77 {
            return Err(BridgeError::Config(format!(
                "token_decimals {} does not fit a uint256",
                self.token_decimals
            )));
        }
        Ok(())
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}
