//! Gas estimation and broadcast helper.
//!
//! # Responsibilities
//! - Estimate gas for a config and keep the latest gas price
//! - Derive the estimated cost once both numbers are known
//! - Broadcast through [`ChainSend`] and classify failures into [`TxError`]
//!
//! The gas price is cached and only refetched once it is older than the
//! configured refresh interval.

use alloy::primitives::{TxHash, U256};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chain::{ChainError, ChainSend};
use crate::observability::metrics;
use crate::transaction::error::TxError;
use crate::transaction::types::TransactionConfig;

/// Numbers shown on the confirmation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub gas: u64,
    pub gas_price: Option<u128>,
    /// `gas * gas_price`, when the price is known.
    pub cost: Option<U256>,
}

pub struct SendHelper {
    chain: Arc<dyn ChainSend>,
    gas_price_ttl: Duration,
    estimated_gas: Option<u64>,
    gas_price: Option<(u128, Instant)>,
    estimating: bool,
    pending: bool,
    error: Option<TxError>,
}

impl SendHelper {
    pub fn new(chain: Arc<dyn ChainSend>, gas_price_ttl: Duration) -> Self {
        Self {
            chain,
            gas_price_ttl,
            estimated_gas: None,
            gas_price: None,
            estimating: false,
            pending: false,
            error: None,
        }
    }

    /// Estimate gas for `config` and refresh the gas price if stale.
    ///
    /// A gas price failure is not fatal: the quote comes back without a cost.
    pub async fn estimate(&mut self, config: &TransactionConfig) -> Result<GasQuote, TxError> {
        self.estimating = true;
        self.estimated_gas = None;
        let estimate = self.chain.estimate_gas(config).await;
        self.estimating = false;

        let gas = match estimate {
            Ok(gas) => gas,
            Err(e) => {
                let err = estimation_error(e);
                tracing::warn!(to = %config.to(), error = %err, "Gas estimation failed");
                metrics::record_send_failure(err.kind());
                return Err(err);
            }
        };
        self.estimated_gas = Some(gas);

        let gas_price = match self.current_gas_price().await {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!(error = %e, "Gas price unavailable");
                None
            }
        };

        let quote = GasQuote {
            gas,
            gas_price,
            cost: self.estimated_gas_cost(),
        };
        tracing::debug!(gas, ?gas_price, cost = ?quote.cost, "Gas estimated");
        Ok(quote)
    }

    /// Gas price, from cache when fresh.
    pub async fn current_gas_price(&mut self) -> Result<u128, ChainError> {
        if let Some((price, fetched_at)) = self.gas_price {
            if fetched_at.elapsed() < self.gas_price_ttl {
                return Ok(price);
            }
        }
        let price = self.chain.gas_price().await?;
        self.gas_price = Some((price, Instant::now()));
        Ok(price)
    }

    /// Sign and broadcast `config`.
    pub async fn send(&mut self, config: &TransactionConfig) -> Result<TxHash, TxError> {
        if !self.chain.has_signer() {
            let err = TxError::WalletNotConnected;
            metrics::record_send_failure(err.kind());
            self.error = Some(err.clone());
            return Err(err);
        }

        self.error = None;
        self.pending = true;
        let result = self.chain.send_transaction(config).await;
        self.pending = false;

        match result {
            Ok(hash) => Ok(hash),
            Err(e) => {
                let err = TxError::from(e);
                tracing::warn!(to = %config.to(), kind = err.kind(), error = %err, "Send failed");
                metrics::record_send_failure(err.kind());
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn estimated_gas(&self) -> Option<u64> {
        self.estimated_gas
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price.map(|(price, _)| price)
    }

    pub fn estimated_gas_cost(&self) -> Option<U256> {
        match (self.estimated_gas, self.gas_price()) {
            (Some(gas), Some(price)) => Some(U256::from(gas) * U256::from(price)),
            _ => None,
        }
    }

    pub fn is_estimating(&self) -> bool {
        self.estimating
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&TxError> {
        self.error.as_ref()
    }

    pub fn reset_error(&mut self) {
        self.error = None;
    }
}

/// Estimation failures that are not otherwise recognized, including
/// simulated reverts, all mean the node could not estimate.
fn estimation_error(err: ChainError) -> TxError {
    let raw = err.to_string();
    match TxError::from(err) {
        TxError::Unknown(_) | TxError::Reverted => TxError::GasEstimationFailed(raw),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{b256, Address};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedSend {
        gas: Result<u64, ChainError>,
        price: Result<u128, ChainError>,
        send: Result<TxHash, ChainError>,
        signer: bool,
        price_calls: AtomicU32,
    }

    impl ScriptedSend {
        fn ok() -> Self {
            Self {
                gas: Ok(21_000),
                price: Ok(2_000_000_000),
                send: Ok(b256!(
                    "00000000000000000000000000000000000000000000000000000000000000ab"
                )),
                signer: true,
                price_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainSend for ScriptedSend {
        async fn estimate_gas(&self, _config: &TransactionConfig) -> Result<u64, ChainError> {
            self.gas.clone()
        }

        async fn gas_price(&self) -> Result<u128, ChainError> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            self.price.clone()
        }

        async fn send_transaction(&self, _config: &TransactionConfig) -> Result<TxHash, ChainError> {
            self.send.clone()
        }

        fn has_signer(&self) -> bool {
            self.signer
        }
    }

    fn cfg() -> TransactionConfig {
        TransactionConfig::new(Address::ZERO, U256::from(100))
    }

    fn scripted_helper(chain: ScriptedSend) -> (SendHelper, Arc<ScriptedSend>) {
        let chain = Arc::new(chain);
        (
            SendHelper::new(chain.clone(), Duration::from_secs(60)),
            chain,
        )
    }

    #[tokio::test]
    async fn test_estimate_derives_cost() {
        let (mut helper, _) = scripted_helper(ScriptedSend::ok());
        let quote = helper.estimate(&cfg()).await.unwrap();
        assert_eq!(quote.gas, 21_000);
        assert_eq!(quote.gas_price, Some(2_000_000_000));
        assert_eq!(quote.cost, Some(U256::from(42_000_000_000_000u64)));
        assert_eq!(helper.estimated_gas_cost(), quote.cost);
        assert!(!helper.is_estimating());
    }

    #[tokio::test]
    async fn test_cost_absent_without_price() {
        let mut chain = ScriptedSend::ok();
        chain.price = Err(ChainError::Rpc("down".into()));
        let (mut helper, _) = scripted_helper(chain);

        let quote = helper.estimate(&cfg()).await.unwrap();
        assert_eq!(quote.gas, 21_000);
        assert!(quote.cost.is_none());
        assert!(helper.estimated_gas_cost().is_none());
    }

    #[tokio::test]
    async fn test_gas_price_is_cached() {
        let (mut helper, chain) = scripted_helper(ScriptedSend::ok());
        helper.estimate(&cfg()).await.unwrap();
        helper.estimate(&cfg()).await.unwrap();
        assert_eq!(chain.price_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gas_price_refetched_when_stale() {
        let chain = Arc::new(ScriptedSend::ok());
        let mut helper = SendHelper::new(chain.clone(), Duration::ZERO);
        helper.current_gas_price().await.unwrap();
        helper.current_gas_price().await.unwrap();
        assert_eq!(chain.price_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_estimation_failure_kinds() {
        let mut chain = ScriptedSend::ok();
        chain.gas = Err(ChainError::Rpc("execution reverted: not owner".into()));
        let (mut helper, _) = scripted_helper(chain);
        assert!(matches!(
            helper.estimate(&cfg()).await,
            Err(TxError::GasEstimationFailed(_))
        ));
        assert!(helper.estimated_gas().is_none());

        let mut chain = ScriptedSend::ok();
        chain.gas = Err(ChainError::Rpc("insufficient funds for gas * price + value".into()));
        let (mut helper, _) = scripted_helper(chain);
        assert_eq!(
            helper.estimate(&cfg()).await.unwrap_err(),
            TxError::InsufficientFunds
        );
    }

    #[tokio::test]
    async fn test_user_rejection_is_normalized() {
        let mut chain = ScriptedSend::ok();
        chain.send = Err(ChainError::Rpc("User rejected the request".into()));
        let (mut helper, _) = scripted_helper(chain);

        let err = helper.send(&cfg()).await.unwrap_err();
        assert_eq!(err, TxError::UserRejected);
        assert_eq!(err.to_string(), "Transaction rejected by user");
        assert_eq!(helper.last_error(), Some(&TxError::UserRejected));

        helper.reset_error();
        assert!(helper.last_error().is_none());
    }

    #[tokio::test]
    async fn test_send_without_signer() {
        let mut chain = ScriptedSend::ok();
        chain.signer = false;
        let (mut helper, _) = scripted_helper(chain);
        assert_eq!(
            helper.send(&cfg()).await.unwrap_err(),
            TxError::WalletNotConnected
        );
    }

    #[tokio::test]
    async fn test_send_success_clears_error() {
        let (mut helper, _) = scripted_helper(ScriptedSend::ok());
        helper.error = Some(TxError::TimedOut);
        let hash = helper.send(&cfg()).await.unwrap();
        assert_eq!(
            hash,
            b256!("00000000000000000000000000000000000000000000000000000000000000ab")
        );
        assert!(helper.last_error().is_none());
        assert!(!helper.is_pending());
    }
}
