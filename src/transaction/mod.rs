//! Transaction lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionConfig
//!     → controller.rs (idle → confirming → pending → success / error)
//!     → send.rs      (estimate gas, broadcast, classify failures)
//!     → receipt.rs   (poll receipt, count confirmations)
//!     → flow.rs      (applies helper results back onto the controller)
//! ```

pub mod controller;
pub mod error;
pub mod flow;
pub mod receipt;
pub mod send;
pub mod types;

pub use controller::{transition, Action, AttemptId, Snapshot, TransactionController};
pub use error::TxError;
pub use flow::TransferFlow;
pub use receipt::{confirmations_since, ConfirmedReceipt, ReceiptOutcome, ReceiptPoller};
pub use send::{GasQuote, SendHelper};
pub use types::{
    GasPricing, ReceiptInfo, ReceiptStatus, TransactionConfig, TransactionState,
    TransactionStatus,
};
