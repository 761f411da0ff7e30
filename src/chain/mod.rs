//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)      AppConfig [chain]
//!     → wallet.rs (key loading)                → client.rs (RPC with timeouts, failover)
//!                 └────────── context.rs (network + client) ──────────┘
//!                                   → capability.rs (ChainSend, ChainReceipt)
//!                                   → transaction helpers
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod capability;
pub mod client;
pub mod context;
pub mod types;
pub mod wallet;

pub use capability::{ChainReceipt, ChainSend};
pub use client::ChainClient;
pub use context::ChainContext;
pub use types::{ChainConfig, ChainError, ChainResult};
pub use wallet::Wallet;
