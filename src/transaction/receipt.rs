//! Receipt confirmation polling.
//!
//! # Responsibilities
//! - Poll [`ChainReceipt`] until the watched transaction is mined
//! - Count confirmations as `current_block - receipt_block + 1`, floored at 0
//! - Report the outcome exactly once per hash
//!
//! # Design Decisions
//! - The "already notified" flag and the count reset whenever the watched
//!   hash changes
//! - Transient RPC failures are retried with jittered backoff; only the
//!   overall deadline ends the wait with [`TxError::TimedOut`], and it cuts
//!   off a query that is still in flight

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::chain::{ChainError, ChainReceipt};
use crate::config::TransactionSettings;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::transaction::error::TxError;
use crate::transaction::types::ReceiptStatus;

/// A successfully mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedReceipt {
    pub hash: TxHash,
    pub block_number: u64,
    pub confirmations: u64,
}

/// Outcome of one wait: success, or the failure to hand to the controller.
pub type ReceiptOutcome = Result<ConfirmedReceipt, TxError>;

/// Blocks at or after `receipt_block`, as seen from `current_block`.
pub fn confirmations_since(receipt_block: u64, current_block: u64) -> u64 {
    current_block.saturating_add(1).saturating_sub(receipt_block)
}

pub struct ReceiptPoller {
    chain: Arc<dyn ChainReceipt>,
    poll_interval: Duration,
    timeout: Duration,
    backoff_base_ms: u64,
    backoff_max_ms: u64,
    watched: Option<TxHash>,
    notified: bool,
    confirmation_count: u64,
}

impl ReceiptPoller {
    pub fn new(chain: Arc<dyn ChainReceipt>, settings: &TransactionSettings) -> Self {
        Self {
            chain,
            poll_interval: settings.poll_interval(),
            timeout: settings.receipt_timeout(),
            backoff_base_ms: settings.backoff_base_ms,
            backoff_max_ms: settings.backoff_max_ms,
            watched: None,
            notified: false,
            confirmation_count: 0,
        }
    }

    /// Switch the watched hash. A different hash re-arms notification.
    pub fn watch(&mut self, hash: Option<TxHash>) {
        if self.watched != hash {
            self.watched = hash;
            self.notified = false;
            self.confirmation_count = 0;
        }
    }

    /// Wait until `hash` is mined with `target` confirmations (minimum 1).
    ///
    /// Returns `None` if the outcome for this hash was already reported.
    pub async fn wait(&mut self, hash: TxHash, target: u64) -> Option<ReceiptOutcome> {
        self.watch(Some(hash));
        if self.notified {
            return None;
        }

        let target = target.max(1);
        let limit = self.timeout;
        let mut backoff = Backoff::new(self.backoff_base_ms, self.backoff_max_ms);

        let polling = async {
            loop {
                let delay = match self.observe(hash, target).await {
                    Ok(Some(outcome)) => return outcome,
                    Ok(None) => {
                        backoff.reset();
                        self.poll_interval
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(
                            tx_hash = %hash,
                            error = %e,
                            failures = backoff.failures(),
                            retry_in_ms = delay.as_millis() as u64,
                            "Receipt query failed"
                        );
                        delay
                    }
                };
                sleep(delay).await;
            }
        };

        // The deadline also bounds an in-flight query.
        let outcome = match timeout(limit, polling).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(tx_hash = %hash, timeout_secs = limit.as_secs(), "Gave up waiting for receipt");
                Err(TxError::TimedOut)
            }
        };

        self.notified = true;
        metrics::record_receipt(match &outcome {
            Ok(_) => "success",
            Err(TxError::Reverted) => "reverted",
            Err(_) => "timed_out",
        });
        Some(outcome)
    }

    async fn observe(
        &mut self,
        hash: TxHash,
        target: u64,
    ) -> Result<Option<ReceiptOutcome>, ChainError> {
        let Some(receipt) = self.chain.wait_for_receipt(hash, target).await? else {
            return Ok(None);
        };
        let current = self.chain.current_block_number().await?;
        self.confirmation_count = confirmations_since(receipt.block_number, current);

        tracing::debug!(
            tx_hash = %hash,
            block_number = receipt.block_number,
            confirmations = self.confirmation_count,
            status = ?receipt.status,
            "Receipt observed"
        );

        Ok(Some(match receipt.status {
            ReceiptStatus::Success => Ok(ConfirmedReceipt {
                hash,
                block_number: receipt.block_number,
                confirmations: self.confirmation_count,
            }),
            ReceiptStatus::Reverted => Err(TxError::Reverted),
        }))
    }

    pub fn confirmation_count(&self) -> u64 {
        self.confirmation_count
    }

    pub fn watched(&self) -> Option<TxHash> {
        self.watched
    }

    pub fn has_notified(&self) -> bool {
        self.notified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::ReceiptInfo;
    use alloy::primitives::b256;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedReceipt {
        receipt: Option<ReceiptInfo>,
        current_block: u64,
        /// Number of leading receipt queries that fail.
        failures: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChainReceipt for ScriptedReceipt {
        async fn wait_for_receipt(
            &self,
            _hash: TxHash,
            _confirmations: u64,
        ) -> Result<Option<ReceiptInfo>, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(ChainError::Rpc("connection reset".into()));
            }
            Ok(self.receipt)
        }

        async fn current_block_number(&self) -> Result<u64, ChainError> {
            Ok(self.current_block)
        }
    }

    fn fast_settings() -> TransactionSettings {
        TransactionSettings {
            receipt_poll_interval_ms: 5,
            receipt_timeout_secs: 1,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
            ..TransactionSettings::default()
        }
    }

    fn scripted_chain(receipt: Option<ReceiptInfo>, current_block: u64) -> Arc<ScriptedReceipt> {
        Arc::new(ScriptedReceipt {
            receipt,
            current_block,
            failures: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        })
    }

    fn mined(block_number: u64, status: ReceiptStatus) -> Option<ReceiptInfo> {
        Some(ReceiptInfo {
            block_number,
            status,
        })
    }

    const H1: TxHash = b256!("0000000000000000000000000000000000000000000000000000000000000001");
    const H2: TxHash = b256!("0000000000000000000000000000000000000000000000000000000000000002");

    #[test]
    fn test_confirmations_since() {
        assert_eq!(confirmations_since(100, 102), 3);
        assert_eq!(confirmations_since(100, 100), 1);
        assert_eq!(confirmations_since(100, 98), 0);
    }

    #[tokio::test]
    async fn test_counts_confirmations() {
        let mut poller = ReceiptPoller::new(scripted_chain(mined(100, ReceiptStatus::Success), 102), &fast_settings());
        let receipt = poller.wait(H1, 1).await.unwrap().unwrap();
        assert_eq!(receipt.confirmations, 3);
        assert_eq!(receipt.block_number, 100);
        assert_eq!(poller.confirmation_count(), 3);
    }

    #[tokio::test]
    async fn test_notifies_once_per_hash() {
        let mut poller = ReceiptPoller::new(scripted_chain(mined(100, ReceiptStatus::Success), 100), &fast_settings());
        assert!(poller.wait(H1, 1).await.is_some());
        assert!(poller.has_notified());
        assert!(poller.wait(H1, 1).await.is_none());

        let receipt = poller.wait(H2, 1).await.unwrap().unwrap();
        assert_eq!(receipt.hash, H2);
    }

    #[tokio::test]
    async fn test_watch_change_resets_count() {
        let mut poller = ReceiptPoller::new(scripted_chain(mined(10, ReceiptStatus::Success), 14), &fast_settings());
        poller.wait(H1, 1).await;
        assert_eq!(poller.confirmation_count(), 5);

        poller.watch(Some(H2));
        assert_eq!(poller.confirmation_count(), 0);
        assert!(!poller.has_notified());

        poller.watch(Some(H2));
        assert_eq!(poller.watched(), Some(H2));
    }

    #[tokio::test]
    async fn test_reverted() {
        let mut poller = ReceiptPoller::new(scripted_chain(mined(7, ReceiptStatus::Reverted), 7), &fast_settings());
        assert_eq!(poller.wait(H1, 1).await, Some(Err(TxError::Reverted)));
    }

    #[tokio::test]
    async fn test_times_out_when_never_mined() {
        let mut settings = fast_settings();
        settings.receipt_timeout_secs = 0;
        let mut poller = ReceiptPoller::new(scripted_chain(None, 1), &settings);
        assert_eq!(poller.wait(H1, 1).await, Some(Err(TxError::TimedOut)));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let chain = scripted_chain(mined(50, ReceiptStatus::Success), 51);
        chain.failures.store(2, Ordering::SeqCst);
        let mut poller = ReceiptPoller::new(chain.clone(), &fast_settings());

        let receipt = poller.wait(H1, 1).await.unwrap().unwrap();
        assert_eq!(receipt.confirmations, 2);
        assert_eq!(chain.calls.load(Ordering::SeqCst), 3);
    }

    struct StalledReceipt;

    #[async_trait]
    impl ChainReceipt for StalledReceipt {
        async fn wait_for_receipt(
            &self,
            _hash: TxHash,
            _confirmations: u64,
        ) -> Result<Option<ReceiptInfo>, ChainError> {
            sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn current_block_number(&self) -> Result<u64, ChainError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_deadline_cuts_off_stalled_query() {
        let mut poller = ReceiptPoller::new(Arc::new(StalledReceipt), &fast_settings());
        let started = std::time::Instant::now();

        assert_eq!(poller.wait(H1, 1).await, Some(Err(TxError::TimedOut)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(poller.has_notified());
    }
}
