//! Transaction lifecycle state machine.
//!
//! # State Machine
//! ```text
//! idle ──request_confirmation──▶ confirming ──confirm_transaction──▶ pending
//!                                    │                                 │ set_transaction_hash
//!                                    └──cancel_transaction──▶ idle     ├──set_success──▶ success
//!                                                                      └──set_error────▶ error
//! error ──retry──▶ confirming      (only while a retry target is held)
//! any   ──reset──▶ idle
//! ```
//!
//! # Design Decisions
//! - No I/O: every operation is a synchronous transition; async work is
//!   driven elsewhere and reported back through the setters
//! - Transitions go through one pure function, [`transition`], which is total
//!   over (state, action) and returns `None` for combinations it ignores
//! - `can_retry` and `is_loading` are computed on read, never stored
//! - `cancel_transaction` drops the retry target as well as the current config

use alloy::primitives::TxHash;
use std::fmt;

use crate::observability::metrics;
use crate::transaction::error::TxError;
use crate::transaction::types::{TransactionConfig, TransactionState, TransactionStatus};

/// Identity of one attempt, bumped on every `request_confirmation`.
///
/// Async work captures the id when it starts and hands it back with its
/// result; results carrying an old id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RequestConfirmation(TransactionConfig),
    Confirm,
    Cancel,
    SetHash(TxHash),
    SetSuccess { confirmations: u64 },
    SetError(TxError),
    Reset,
    Retry,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestConfirmation(_) => "request_confirmation",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::SetHash(_) => "set_hash",
            Self::SetSuccess { .. } => "set_success",
            Self::SetError(_) => "set_error",
            Self::Reset => "reset",
            Self::Retry => "retry",
        }
    }
}

/// Everything the controller owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub state: TransactionState,
    /// Config of the active attempt.
    pub config: Option<TransactionConfig>,
    /// Last config handed to `request_confirmation`.
    pub retry_target: Option<TransactionConfig>,
    pub attempt: AttemptId,
}

/// Compute the next snapshot, or `None` when the action does not apply.
pub fn transition(current: &Snapshot, action: Action) -> Option<Snapshot> {
    use TransactionStatus::*;

    match (current.state.status, action) {
        (_, Action::RequestConfirmation(config)) => Some(Snapshot {
            state: TransactionState {
                status: Confirming,
                ..TransactionState::default()
            },
            config: Some(config.clone()),
            retry_target: Some(config),
            attempt: AttemptId(current.attempt.0.wrapping_add(1)),
        }),

        (Confirming, Action::Confirm) => {
            let mut next = current.clone();
            next.state.status = Pending;
            next.state.error = None;
            Some(next)
        }

        (_, Action::Cancel) | (_, Action::Reset) => Some(Snapshot {
            attempt: current.attempt,
            ..Snapshot::default()
        }),

        (Pending, Action::SetHash(hash)) => {
            let mut next = current.clone();
            next.state.hash = Some(hash);
            Some(next)
        }

        (Pending | Success, Action::SetSuccess { confirmations }) => {
            let mut next = current.clone();
            next.state.status = Success;
            next.state.confirmations = confirmations;
            next.state.error = None;
            Some(next)
        }

        (Confirming | Pending | Error, Action::SetError(error)) => {
            let mut next = current.clone();
            next.state.status = Error;
            next.state.error = Some(error);
            Some(next)
        }

        (Error, Action::Retry) => {
            let target = current.retry_target.clone()?;
            transition(current, Action::RequestConfirmation(target))
        }

        _ => None,
    }
}

/// Owner of one logical transaction at a time.
#[derive(Debug, Default)]
pub struct TransactionController {
    inner: Snapshot,
}

impl TransactionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let from = self.inner.state.status;
        let name = action.name();

        match transition(&self.inner, action) {
            Some(next) => {
                self.inner = next;
                let to = self.inner.state.status;
                tracing::debug!(
                    action = name,
                    from = %from,
                    to = %to,
                    attempt = %self.inner.attempt,
                    "Transaction transition"
                );
                metrics::record_transition(to);
                true
            }
            None => {
                tracing::debug!(action = name, status = %from, "Ignoring action in current state");
                metrics::record_ignored_action(name);
                false
            }
        }
    }

    /// Apply an action only if `attempt` is still the active attempt.
    pub fn dispatch_for(&mut self, attempt: AttemptId, action: Action) -> bool {
        if attempt != self.inner.attempt {
            tracing::debug!(
                action = action.name(),
                stale = %attempt,
                current = %self.inner.attempt,
                "Discarding result from superseded attempt"
            );
            metrics::record_ignored_action(action.name());
            return false;
        }
        self.dispatch(action)
    }

    pub fn request_confirmation(&mut self, config: TransactionConfig) -> AttemptId {
        self.dispatch(Action::RequestConfirmation(config));
        self.inner.attempt
    }

    pub fn confirm_transaction(&mut self) -> bool {
        self.dispatch(Action::Confirm)
    }

    pub fn cancel_transaction(&mut self) {
        self.dispatch(Action::Cancel);
    }

    pub fn set_transaction_hash(&mut self, hash: TxHash) -> bool {
        self.dispatch(Action::SetHash(hash))
    }

    pub fn set_success(&mut self, confirmations: u64) -> bool {
        self.dispatch(Action::SetSuccess { confirmations })
    }

    pub fn set_error(&mut self, error: TxError) -> bool {
        self.dispatch(Action::SetError(error))
    }

    pub fn reset(&mut self) {
        self.dispatch(Action::Reset);
    }

    /// Re-enter confirmation with the retained config. No-op unless
    /// [`can_retry`](Self::can_retry).
    pub fn retry(&mut self) -> Option<AttemptId> {
        self.dispatch(Action::Retry).then_some(self.inner.attempt)
    }

    pub fn state(&self) -> &TransactionState {
        &self.inner.state
    }

    pub fn status(&self) -> TransactionStatus {
        self.inner.state.status
    }

    pub fn hash(&self) -> Option<TxHash> {
        self.inner.state.hash
    }

    pub fn error(&self) -> Option<&TxError> {
        self.inner.state.error.as_ref()
    }

    pub fn confirmations(&self) -> u64 {
        self.inner.state.confirmations
    }

    pub fn config(&self) -> Option<&TransactionConfig> {
        self.inner.config.as_ref()
    }

    pub fn attempt(&self) -> AttemptId {
        self.inner.attempt
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.inner
    }

    pub fn can_retry(&self) -> bool {
        self.inner.state.status == TransactionStatus::Error && self.inner.retry_target.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.inner.state.status,
            TransactionStatus::Confirming | TransactionStatus::Pending
        )
    }
}
