//! Chain-level types and error definitions.

use thiserror::Error;

pub use crate::config::schema::ChainConfig;

/// Errors reported by chain capabilities.
///
/// These carry the node's or wallet's text unchanged; the transaction layer
/// classifies them into [`TxError`](crate::transaction::TxError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The signer declined to sign.
    ///
    /// Raised by `ChainSend` implementations backed by an interactive signer
    /// (hardware or browser wallets). `ChainClient` signs with a local key and
    /// reports node-side refusals as [`ChainError::Rpc`] text instead.
    #[error("Signer rejected the request: {0}")]
    Rejected(String),

    /// Sending was requested on a client without a signer.
    #[error("No signer configured")]
    NoSigner,

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Chain ID missing from the network catalog.
    #[error("Unsupported chain ID {0}")]
    UnsupportedChain(u64),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();
        assert_eq!(config.rpc_timeout_secs, 10);
        assert_eq!(config.chain_id, 1);
        assert!(config.failover_urls.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = ChainError::ChainMismatch {
            expected: 1,
            actual: 8453,
        };
        assert!(err.to_string().contains("8453"));
    }
}
