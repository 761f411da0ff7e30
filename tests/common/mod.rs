//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{b256, TxHash};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use txflow::chain::{ChainError, ChainReceipt, ChainSend};
use txflow::config::TransactionSettings;
use txflow::transaction::{ReceiptInfo, ReceiptStatus, TransactionConfig};

pub const HASH_A: TxHash =
    b256!("00000000000000000000000000000000000000000000000000000000000000a1");
pub const HASH_B: TxHash =
    b256!("00000000000000000000000000000000000000000000000000000000000000b2");

/// A chain whose answers are scripted per call.
///
/// Each queue is consumed front to back; once a queue holds a single entry
/// that entry repeats.
pub struct MockChain {
    estimates: Mutex<VecDeque<Result<u64, ChainError>>>,
    gas_price: Result<u128, ChainError>,
    sends: Mutex<VecDeque<Result<TxHash, ChainError>>>,
    receipts: Mutex<VecDeque<Result<Option<ReceiptInfo>, ChainError>>>,
    block_number: AtomicU64,
    signer: bool,
    pub send_calls: AtomicU32,
    pub sent: Mutex<Vec<TransactionConfig>>,
}

impl MockChain {
    /// Estimates 21k gas at 1 gwei, sends `HASH_A`, mined at block 100 with
    /// the head at 100.
    pub fn new() -> Self {
        Self {
            estimates: Mutex::new(VecDeque::from([Ok(21_000)])),
            gas_price: Ok(1_000_000_000),
            sends: Mutex::new(VecDeque::from([Ok(HASH_A)])),
            receipts: Mutex::new(VecDeque::from([Ok(Some(ReceiptInfo {
                block_number: 100,
                status: ReceiptStatus::Success,
            }))])),
            block_number: AtomicU64::new(100),
            signer: true,
            send_calls: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn without_signer(mut self) -> Self {
        self.signer = false;
        self
    }

    pub fn with_estimates(self, script: Vec<Result<u64, ChainError>>) -> Self {
        *self.estimates.lock().unwrap() = script.into();
        self
    }

    pub fn with_sends(self, script: Vec<Result<TxHash, ChainError>>) -> Self {
        *self.sends.lock().unwrap() = script.into();
        self
    }

    pub fn with_receipts(self, script: Vec<Result<Option<ReceiptInfo>, ChainError>>) -> Self {
        *self.receipts.lock().unwrap() = script.into();
        self
    }

    pub fn at_block(self, block: u64) -> Self {
        self.block_number.store(block, Ordering::SeqCst);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn next<T: Clone>(queue: &Mutex<VecDeque<T>>) -> T {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().expect("empty script")
    }
}

#[async_trait]
impl ChainSend for MockChain {
    async fn estimate_gas(&self, _config: &TransactionConfig) -> Result<u64, ChainError> {
        next(&self.estimates)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.gas_price.clone()
    }

    async fn send_transaction(&self, config: &TransactionConfig) -> Result<TxHash, ChainError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(config.clone());
        next(&self.sends)
    }

    fn has_signer(&self) -> bool {
        self.signer
    }
}

#[async_trait]
impl ChainReceipt for MockChain {
    async fn wait_for_receipt(
        &self,
        _hash: TxHash,
        _confirmations: u64,
    ) -> Result<Option<ReceiptInfo>, ChainError> {
        next(&self.receipts)
    }

    async fn current_block_number(&self) -> Result<u64, ChainError> {
        Ok(self.block_number.load(Ordering::SeqCst))
    }
}

/// Fast polling so tests finish in milliseconds.
pub fn fast_settings() -> TransactionSettings {
    TransactionSettings {
        confirmations: 1,
        receipt_poll_interval_ms: 2,
        receipt_timeout_secs: 2,
        gas_price_refresh_secs: 60,
        backoff_base_ms: 1,
        backoff_max_ms: 4,
    }
}
