//! JSON-RPC chain client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the primary endpoint and any failover endpoints
//! - Estimate gas, price gas, broadcast signed transactions
//! - Query receipts and block height for confirmation tracking
//! - Enforce a per-request timeout on every call

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::capability::{ChainReceipt, ChainSend};
use crate::chain::types::{ChainConfig, ChainError, ChainResult};
use crate::chain::wallet::Wallet;
use crate::transaction::{GasPricing, ReceiptInfo, ReceiptStatus, TransactionConfig};

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Chain client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// Read providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Signer-backed provider on the primary endpoint.
    sender: Option<DynProvider>,
    /// Address of the signer, used as `from` for estimates.
    from: Option<Address>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a read-only client.
    ///
    /// Succeeds even when the endpoint is unreachable; a chain id mismatch is
    /// logged, not fatal.
    pub async fn new(config: ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            sender: None,
            from: None,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Chain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Attach a signer. Sends go through the primary endpoint only.
    pub fn with_wallet(mut self, wallet: &Wallet) -> ChainResult<Self> {
        if wallet.chain_id() != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: wallet.chain_id(),
            });
        }

        let url: url::Url = self.config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", self.config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url);

        self.sender = Some(Arc::new(provider) as DynProvider);
        self.from = Some(wallet.address());
        Ok(self)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id,
            });
        }
        Ok(())
    }

    pub async fn get_chain_id(&self) -> ChainResult<u64> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
    }

    pub async fn get_block_number(&self) -> ChainResult<u64> {
        self.with_failover("get block number", |p| async move {
            p.get_block_number().await
        })
        .await
    }

    pub async fn get_gas_price(&self) -> ChainResult<u128> {
        self.with_failover("get gas price", |p| async move { p.get_gas_price().await })
            .await
    }

    /// Run `call` against each provider in order until one answers.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, call: F) -> ChainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = None;

        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider");
                    last_error = Some(ChainError::Rpc(format!(
                        "All RPC providers failed to {}: {}",
                        op, e
                    )));
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = Some(ChainError::Timeout(self.config.rpc_timeout_secs));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ChainError::Rpc("No RPC providers configured".to_string())))
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Signer address, if a wallet is attached.
    pub fn from_address(&self) -> Option<Address> {
        self.from
    }
}

/// Translate a transfer config into an RPC transaction request.
pub fn to_request(config: &TransactionConfig, from: Option<Address>) -> TransactionRequest {
    let mut tx = TransactionRequest::default()
        .with_to(config.to())
        .with_value(config.value());

    if let Some(from) = from {
        tx = tx.with_from(from);
    }
    if let Some(data) = config.data() {
        tx = tx.with_input(data.clone());
    }
    if let Some(gas_limit) = config.gas_limit() {
        tx = tx.with_gas_limit(gas_limit);
    }
    match config.pricing() {
        Some(GasPricing::Legacy { gas_price }) => {
            tx = tx.with_gas_price(gas_price);
        }
        Some(GasPricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }) => {
            tx = tx
                .with_max_fee_per_gas(max_fee_per_gas)
                .with_max_priority_fee_per_gas(max_priority_fee_per_gas);
        }
        None => {}
    }
    tx
}

#[async_trait]
impl ChainSend for ChainClient {
    async fn estimate_gas(&self, config: &TransactionConfig) -> ChainResult<u64> {
        let request = to_request(config, self.from);
        self.with_failover("estimate gas", |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    async fn gas_price(&self) -> ChainResult<u128> {
        self.get_gas_price().await
    }

    async fn send_transaction(&self, config: &TransactionConfig) -> ChainResult<TxHash> {
        let sender = self.sender.as_ref().ok_or(ChainError::NoSigner)?;
        let request = to_request(config, self.from);

        match timeout(self.timeout_duration, sender.send_transaction(request)).await {
            Ok(Ok(pending)) => {
                let hash = *pending.tx_hash();
                tracing::info!(tx_hash = %hash, to = %config.to(), "Transaction broadcast");
                Ok(hash)
            }
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    fn has_signer(&self) -> bool {
        self.sender.is_some()
    }
}

#[async_trait]
impl ChainReceipt for ChainClient {
    async fn wait_for_receipt(
        &self,
        hash: TxHash,
        confirmations: u64,
    ) -> ChainResult<Option<ReceiptInfo>> {
        let receipt = self
            .with_failover("get receipt", |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;

        let Some(receipt) = receipt else {
            tracing::debug!(tx_hash = %hash, "Transaction pending");
            return Ok(None);
        };
        let Some(block_number) = receipt.block_number else {
            return Ok(None);
        };

        if confirmations > 1 {
            let current = self.get_block_number().await?;
            if (current + 1).saturating_sub(block_number) < confirmations {
                tracing::debug!(
                    tx_hash = %hash,
                    block_number,
                    current,
                    required = confirmations,
                    "Waiting for confirmations"
                );
                return Ok(None);
            }
        }

        let status = if receipt.status() {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Reverted
        };
        Ok(Some(ReceiptInfo {
            block_number,
            status,
        }))
    }

    async fn current_block_number(&self) -> ChainResult<u64> {
        self.get_block_number().await
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .field("has_signer", &self.sender.is_some())
            .finish()
    }
}
