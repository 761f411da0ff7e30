//! Transfer flow: the controller wired to its helpers.
//!
//! ```text
//! submit(config)   request_confirmation → estimate gas → quote for the user
//! confirm()        confirm_transaction → send → set_transaction_hash
//!                  → wait for receipt → set_success / set_error
//! cancel()         cancel_transaction
//! retry()          retry → estimate gas again
//! close()          reset, clear send error, stop watching
//! ```
//!
//! Every async result is applied with the attempt id captured before the
//! await, so results from a superseded attempt never reach the controller.
//! Each new attempt re-arms the receipt poller, and every `confirm` ends in
//! `success` or `error`.

use std::sync::Arc;

use crate::chain::{ChainContext, ChainReceipt, ChainSend};
use crate::config::TransactionSettings;
use crate::transaction::controller::{Action, AttemptId, TransactionController};
use crate::transaction::error::TxError;
use crate::transaction::receipt::{ConfirmedReceipt, ReceiptPoller};
use crate::transaction::send::{GasQuote, SendHelper};
use crate::transaction::types::TransactionConfig;

pub struct TransferFlow {
    controller: TransactionController,
    sender: SendHelper,
    poller: ReceiptPoller,
    confirmations: u64,
    quote: Option<GasQuote>,
}

impl TransferFlow {
    pub fn new(
        send: Arc<dyn ChainSend>,
        receipt: Arc<dyn ChainReceipt>,
        settings: &TransactionSettings,
    ) -> Self {
        Self {
            controller: TransactionController::new(),
            sender: SendHelper::new(send, settings.gas_price_ttl()),
            poller: ReceiptPoller::new(receipt, settings),
            confirmations: settings.confirmations.max(1),
            quote: None,
        }
    }

    pub fn from_context(context: &ChainContext, settings: &TransactionSettings) -> Self {
        let client = context.client();
        Self::new(client.clone(), client, settings)
    }

    /// Override the confirmation target for subsequent sends.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Open confirmation for `config` and estimate its gas.
    ///
    /// An estimation failure moves the controller to `error` so the attempt
    /// can be retried.
    pub async fn submit(&mut self, config: TransactionConfig) -> Result<GasQuote, TxError> {
        tracing::info!(to = %config.to(), value = %config.value(), "Transfer requested");
        let attempt = self.controller.request_confirmation(config.clone());
        self.prepare(attempt, &config).await
    }

    async fn prepare(
        &mut self,
        attempt: AttemptId,
        config: &TransactionConfig,
    ) -> Result<GasQuote, TxError> {
        self.quote = None;
        self.poller.watch(None);
        match self.sender.estimate(config).await {
            Ok(quote) => {
                if attempt == self.controller.attempt() {
                    self.quote = Some(quote);
                }
                Ok(quote)
            }
            Err(e) => {
                self.controller
                    .dispatch_for(attempt, Action::SetError(e.clone()));
                Err(e)
            }
        }
    }

    /// User approved: broadcast and wait for the receipt.
    pub async fn confirm(&mut self) -> Result<ConfirmedReceipt, TxError> {
        let Some(config) = self.controller.config().cloned() else {
            return Err(TxError::InvalidConfig(
                "No transaction awaiting confirmation".to_string(),
            ));
        };
        let attempt = self.controller.attempt();
        if !self.controller.confirm_transaction() {
            return Err(TxError::InvalidConfig(format!(
                "Cannot confirm while {}",
                self.controller.status()
            )));
        }

        let hash = match self.sender.send(&config).await {
            Ok(hash) => hash,
            Err(e) => {
                self.controller
                    .dispatch_for(attempt, Action::SetError(e.clone()));
                return Err(e);
            }
        };
        self.controller.dispatch_for(attempt, Action::SetHash(hash));
        tracing::info!(tx_hash = %hash, attempt = %attempt, "Waiting for receipt");

        match self.poller.wait(hash, self.confirmations).await {
            Some(Ok(receipt)) => {
                self.controller.dispatch_for(
                    attempt,
                    Action::SetSuccess {
                        confirmations: receipt.confirmations,
                    },
                );
                tracing::info!(
                    tx_hash = %hash,
                    block_number = receipt.block_number,
                    confirmations = receipt.confirmations,
                    "Transfer confirmed"
                );
                Ok(receipt)
            }
            Some(Err(e)) => {
                self.controller
                    .dispatch_for(attempt, Action::SetError(e.clone()));
                tracing::warn!(tx_hash = %hash, error = %e, "Transfer failed");
                Err(e)
            }
            None => {
                let e = TxError::Unknown(format!("Receipt for {} was already reported", hash));
                self.controller
                    .dispatch_for(attempt, Action::SetError(e.clone()));
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.controller.cancel_transaction();
        self.poller.watch(None);
        self.quote = None;
    }

    /// Re-open confirmation with the failed config and estimate afresh.
    /// `None` when there is nothing to retry.
    pub async fn retry(&mut self) -> Option<Result<GasQuote, TxError>> {
        let attempt = self.controller.retry()?;
        let config = self.controller.config().cloned()?;
        tracing::info!(attempt = %attempt, to = %config.to(), "Retrying transfer");
        Some(self.prepare(attempt, &config).await)
    }

    /// Dismiss the status view.
    pub fn close(&mut self) {
        self.controller.reset();
        self.sender.reset_error();
        self.poller.watch(None);
        self.quote = None;
    }

    pub fn controller(&self) -> &TransactionController {
        &self.controller
    }

    pub fn quote(&self) -> Option<&GasQuote> {
        self.quote.as_ref()
    }

    pub fn sender(&self) -> &SendHelper {
        &self.sender
    }

    pub fn confirmation_count(&self) -> u64 {
        self.poller.confirmation_count()
    }
}
