//! Chain capabilities consumed by the transaction helpers.
//!
//! The helpers never talk to a node directly. Anything that can estimate,
//! send and report receipts can drive them: [`ChainClient`](super::ChainClient)
//! over JSON-RPC in production, scripted mocks in tests.

use alloy::primitives::TxHash;
use async_trait::async_trait;

use crate::chain::types::ChainResult;
use crate::transaction::{ReceiptInfo, TransactionConfig};

/// Estimate, price and broadcast transactions.
#[async_trait]
pub trait ChainSend: Send + Sync {
    /// Gas units the transaction is expected to consume.
    async fn estimate_gas(&self, config: &TransactionConfig) -> ChainResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> ChainResult<u128>;

    /// Sign and broadcast. Returns once the node has accepted the transaction.
    async fn send_transaction(&self, config: &TransactionConfig) -> ChainResult<TxHash>;

    /// Whether a signer is available for `send_transaction`.
    fn has_signer(&self) -> bool;
}

/// Observe inclusion of broadcast transactions.
#[async_trait]
pub trait ChainReceipt: Send + Sync {
    /// Receipt for `hash` once it is mined with at least `confirmations`
    /// blocks on top (counting its own). `None` while still waiting.
    async fn wait_for_receipt(
        &self,
        hash: TxHash,
        confirmations: u64,
    ) -> ChainResult<Option<ReceiptInfo>>;

    /// Latest block number.
    async fn current_block_number(&self) -> ChainResult<u64>;
}
