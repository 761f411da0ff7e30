//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// RPC endpoint settings.
    pub chain: ChainConfig,

    /// Receipt tracking and gas estimation settings.
    pub transaction: TransactionSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
        }
    }
}

/// Transaction lifecycle tuning.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionSettings {
    /// Blocks (including the inclusion block) before a receipt counts.
    pub confirmations: u64,

    /// Delay between receipt polls in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Give up waiting for a receipt after this many seconds.
    pub receipt_timeout_secs: u64,

    /// Cached gas price is refetched once older than this.
    pub gas_price_refresh_secs: u64,

    /// Base delay for backoff after a failed receipt query.
    pub backoff_base_ms: u64,

    /// Maximum backoff delay.
    pub backoff_max_ms: u64,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            confirmations: 1,
            receipt_poll_interval_ms: 3000,
            receipt_timeout_secs: 300,
            gas_price_refresh_secs: 10,
            backoff_base_ms: 250,
            backoff_max_ms: 5000,
        }
    }
}

impl TransactionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn gas_price_ttl(&self) -> Duration {
        Duration::from_secs(self.gas_price_refresh_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
