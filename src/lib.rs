//! Client-side transaction lifecycle library.
//!
//! # Architecture Overview
//!
//! ```text
//!   UI / CLI
//!      │  request_confirmation / confirm / cancel / retry / reset
//!      ▼
//!  ┌───────────────────────────────────────────────────────────┐
//!  │ transaction::flow::TransferFlow                           │
//!  │   ┌──────────────────────┐                                │
//!  │   │ TransactionController│  pure state machine, no I/O    │
//!  │   └──────────▲───────────┘                                │
//!  │              │ setters applied on resolution              │
//!  │   ┌──────────┴───────────┐   ┌──────────────────────────┐ │
//!  │   │ SendHelper           │   │ ReceiptPoller            │ │
//!  │   │ estimate / send      │   │ wait / confirmations     │ │
//!  │   └──────────┬───────────┘   └────────────┬─────────────┘ │
//!  └──────────────┼────────────────────────────┼───────────────┘
//!                 ▼                            ▼
//!           chain::ChainSend            chain::ChainReceipt
//!                 └──────── chain::ChainClient (alloy) ────────┘
//! ```

pub mod chain;
pub mod config;
pub mod networks;
pub mod observability;
pub mod resilience;
pub mod transaction;

pub use chain::{ChainClient, ChainContext, ChainError, ChainReceipt, ChainSend, Wallet};
pub use config::AppConfig;
pub use networks::Network;
pub use transaction::{
    Action, AttemptId, TransactionConfig, TransactionController, TransactionState,
    TransactionStatus, TransferFlow, TxError,
};
