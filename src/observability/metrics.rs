//! Lifecycle counters.
//!
//! # Metrics
//! - `txflow_transitions_total` (counter): applied transitions by target status
//! - `txflow_ignored_actions_total` (counter): no-op or stale actions by name
//! - `txflow_send_failures_total` (counter): classified send/estimate failures
//! - `txflow_receipts_total` (counter): receipt outcomes (success, reverted, timed_out)

use crate::transaction::TransactionStatus;

pub fn record_transition(to: TransactionStatus) {
    metrics::counter!("txflow_transitions_total", "to" => to.as_str()).increment(1);
}

pub fn record_ignored_action(action: &'static str) {
    metrics::counter!("txflow_ignored_actions_total", "action" => action).increment(1);
}

pub fn record_send_failure(kind: &'static str) {
    metrics::counter!("txflow_send_failures_total", "kind" => kind).increment(1);
}

pub fn record_receipt(outcome: &'static str) {
    metrics::counter!("txflow_receipts_total", "outcome" => outcome).increment(1);
}
