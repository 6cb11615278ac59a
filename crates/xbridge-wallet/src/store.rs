//! Wallet store: a JSON file listing named private keys.
//!
//! ```json
//! { "wallets": [ { "name": "Wallet1", "privatekey": "0x..." } ] }
//! ```

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use xbridge_types::{BridgeError, Result};

const DEFAULT_WALLET_NAME: &str = "Wallet";

/// Shape printed to the operator when the wallet store cannot be loaded.
pub const EXPECTED_SHAPE: &str = r#"{
  "wallets": [
    {
      "name": "Wallet1",
      "privatekey": "0xYourPrivateKeyHere"
    }
  ]
}"#;

/// On-disk wallet file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletFile {
    pub wallets: Vec<WalletEntry>,
}

/// A single wallet entry as written by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub privatekey: String,
}

/// A loaded wallet, immutable for the run.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub name: String,
    pub signer: PrivateKeySigner,
}

impl Wallet {
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Read and parse the wallet store at `path`.
pub fn load_wallets(path: impl AsRef<Path>) -> Result<Vec<Wallet>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .map_err(|e| BridgeError::Load(format!("{}: {}", path.display(), e)))?;
    parse_wallets(&data)
}

/// Parse wallet store contents.
///
/// An empty list is rejected: a run without wallets has nothing to do.
pub fn parse_wallets(data: &str) -> Result<Vec<Wallet>> {
    let file: WalletFile =
        serde_json::from_str(data).map_err(|e| BridgeError::Load(e.to_string()))?;

    if file.wallets.is_empty() {
        return Err(BridgeError::Load("wallet list is empty".into()));
    }

    file.wallets
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let signer: PrivateKeySigner = entry.privatekey.trim().parse().map_err(|e| {
                BridgeError::Load(format!("invalid private key for wallet #{}: {}", i + 1, e))
            })?;
            let name = entry
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WALLET_NAME.to_string());
            debug!(%name, address = %signer.address(), "wallet loaded");
            Ok(Wallet { name, signer })
        })
        .collect()
}
