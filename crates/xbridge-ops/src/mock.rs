//! In-memory chain and packet index for engine tests.

use alloy::primitives::{address, Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use xbridge_chain::{ReceiptStatus, TokenBridgeChain, TransferRequest};
use xbridge_relay::PacketIndex;
use xbridge_types::{BridgeError, Hex, Result};

pub struct MockChain {
    owner: Address,
    balance: U256,
    allowance: Mutex<U256>,
    approve_status: ReceiptStatus,
    send_status: ReceiptStatus,
    failing_reads: bool,
    failing_send: bool,
    approvals: Mutex<Vec<(Address, Address, U256)>>,
    sends: Mutex<Vec<TransferRequest>>,
    receipts: Mutex<HashMap<TxHash, ReceiptStatus>>,
    nonce: Mutex<u8>,
}

impl MockChain {
    pub const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    pub const TOKEN: Address = address!("4B5DF730C2e6b28E17013A1485E5d9BC41Efe021");
    pub const BRIDGE: Address = address!("7B5Fe22B5446f7C62Ea27B8BD71CeF94e03f3dF2");

    pub fn new() -> Self {
        Self {
            owner: Self::OWNER,
            balance: U256::ZERO,
            allowance: Mutex::new(U256::ZERO),
            approve_status: ReceiptStatus::Success,
            send_status: ReceiptStatus::Success,
            failing_reads: false,
            failing_send: false,
            approvals: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            nonce: Mutex::new(0),
        }
    }

    /// `n` whole tokens at 18 decimals.
    pub fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        *self.allowance.lock().unwrap() = allowance;
        self
    }

    pub fn with_approve_status(mut self, status: ReceiptStatus) -> Self {
        self.approve_status = status;
        self
    }

    pub fn with_send_status(mut self, status: ReceiptStatus) -> Self {
        self.send_status = status;
        self
    }

    pub fn with_failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub fn with_failing_send(mut self) -> Self {
        self.failing_send = true;
        self
    }

    pub fn approvals(&self) -> Vec<(Address, Address, U256)> {
        self.approvals.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<TransferRequest> {
        self.sends.lock().unwrap().clone()
    }

    pub fn transactions_sent(&self) -> usize {
        self.approvals.lock().unwrap().len() + self.sends.lock().unwrap().len()
    }

    fn next_tx(&self, status: ReceiptStatus) -> TxHash {
        let mut nonce = self.nonce.lock().unwrap();
        *nonce += 1;
        let tx_hash = B256::with_last_byte(*nonce);
        self.receipts.lock().unwrap().insert(tx_hash, status);
        tx_hash
    }
}

#[async_trait]
impl TokenBridgeChain for MockChain {
    fn owner(&self) -> Address {
        self.owner
    }

    async fn balance_of(&self, _token: Address, _owner: Address) -> Result<U256> {
        if self.failing_reads {
            return Err(BridgeError::Rpc("connection refused".into()));
        }
        Ok(self.balance)
    }

    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        if self.failing_reads {
            return Err(BridgeError::Rpc("connection refused".into()));
        }
        Ok(*self.allowance.lock().unwrap())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        self.approvals.lock().unwrap().push((token, spender, amount));
        if self.approve_status.is_success() {
            *self.allowance.lock().unwrap() = amount;
        }
        Ok(self.next_tx(self.approve_status))
    }

    async fn send(&self, _bridge: Address, request: &TransferRequest) -> Result<TxHash> {
        if self.failing_send {
            return Err(BridgeError::Submission("insufficient funds for gas".into()));
        }
        self.sends.lock().unwrap().push(request.clone());
        Ok(self.next_tx(self.send_status))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptStatus> {
        self.receipts
            .lock()
            .unwrap()
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| BridgeError::Rpc(format!("unknown transaction {}", tx_hash)))
    }
}

/// Packet index that either always misses or finds a hash on a given query.
pub struct MockIndex {
    found_on: Option<u32>,
    queries: Mutex<u32>,
}

impl MockIndex {
    pub fn never() -> Self {
        Self {
            found_on: None,
            queries: Mutex::new(0),
        }
    }

    pub fn found_on(query: u32) -> Self {
        Self {
            found_on: Some(query),
            queries: Mutex::new(0),
        }
    }

    pub fn queries(&self) -> u32 {
        *self.queries.lock().unwrap()
    }
}

#[async_trait]
impl PacketIndex for MockIndex {
    async fn find_packet_hash(&self, tx_hash: &str) -> Result<Option<Hex>> {
        let mut queries = self.queries.lock().unwrap();
        *queries += 1;
        match self.found_on {
            Some(n) if *queries >= n => Ok(Some(format!("{}feed", tx_hash))),
            _ => Ok(None),
        }
    }
}
