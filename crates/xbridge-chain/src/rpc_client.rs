//! JSON-RPC implementation of [`TokenBridgeChain`].

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use xbridge_types::{BridgeError, Result};

use crate::contracts::{IZkgm, IERC20};
use crate::{ChainConfig, ReceiptStatus, TokenBridgeChain, TransferRequest};

/// Chain client signing with a single local wallet.
pub struct RpcChainClient {
    provider: DynProvider,
    owner: Address,
    receipt_timeout: Option<Duration>,
}

impl RpcChainClient {
    /// Connect to the endpoint selected by `config.rpc_index`.
    pub fn new(config: &ChainConfig, signer: PrivateKeySigner) -> Result<Self> {
        let rpc_url = config.active_rpc_url()?;
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| BridgeError::Config(format!("invalid rpc url {}: {}", rpc_url, e)))?;

        let owner = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        debug!(%owner, rpc_url, "chain client ready");

        Ok(Self {
            provider,
            owner,
            receipt_timeout: config.receipt_timeout_secs.map(Duration::from_secs),
        })
    }
}

fn rpc_err(e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Rpc(e.to_string())
}

#[async_trait]
impl TokenBridgeChain for RpcChainClient {
    fn owner(&self) -> Address {
        self.owner
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(rpc_err)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(rpc_err)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let pending = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .send()
            .await
            .map_err(rpc_err)?;

        debug!(tx_hash = %pending.tx_hash(), %token, %spender, "approve broadcast");
        Ok(*pending.tx_hash())
    }

    async fn send(&self, bridge: Address, request: &TransferRequest) -> Result<TxHash> {
        let pending = IZkgm::new(bridge, &self.provider)
            .send(
                request.channel_id,
                request.timeout_height,
                request.timeout_timestamp,
                request.salt,
                (&request.instruction).into(),
            )
            .send()
            .await
            .map_err(|e| BridgeError::Submission(e.to_string()))?;

        debug!(
            tx_hash = %pending.tx_hash(),
            channel_id = request.channel_id,
            salt = %request.salt,
            "bridge send broadcast"
        );
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptStatus> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await
            .map_err(rpc_err)?;

        debug!(
            %tx_hash,
            block_number = ?receipt.block_number(),
            status = receipt.status(),
            "receipt received"
        );
        Ok(receipt.status().into())
    }
}
