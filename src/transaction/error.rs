//! Normalized transaction errors.
//!
//! Chain clients and wallets report failures as free text. Everything that
//! reaches the controller goes through [`TxError::classify`] first, so the UI
//! can branch on a kind instead of parsing messages.

use thiserror::Error;

use crate::chain::ChainError;

const REJECTION_PHRASES: &[&str] = &["user rejected", "user denied", "rejected the request"];
const INSUFFICIENT_FUNDS_PHRASES: &[&str] = &["insufficient funds"];
const NONCE_PHRASES: &[&str] = &[
    "nonce too low",
    "nonce too high",
    "replacement transaction underpriced",
    "already known",
];
const ESTIMATION_PHRASES: &[&str] = &["gas required exceeds", "cannot estimate gas"];
const REVERT_PHRASES: &[&str] = &["execution reverted", "reverted"];
const TIMEOUT_PHRASES: &[&str] = &["timeout", "timed out"];

/// Failure surfaced in the controller's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Insufficient funds for transfer and gas")]
    InsufficientFunds,

    #[error("Nonce conflict with a pending transaction")]
    NonceConflict,

    #[error("Gas estimation failed: {0}")]
    GasEstimationFailed(String),

    #[error("Transaction reverted")]
    Reverted,

    #[error("Transaction timed out")]
    TimedOut,

    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The transaction config itself is malformed.
    #[error("Invalid transaction: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Unknown(String),
}

impl TxError {
    /// Classify a raw failure message from a wallet or RPC node.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let matches = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

        // First matching family wins.
        if matches(REJECTION_PHRASES) {
            Self::UserRejected
        } else if matches(INSUFFICIENT_FUNDS_PHRASES) {
            Self::InsufficientFunds
        } else if matches(NONCE_PHRASES) {
            Self::NonceConflict
        } else if matches(ESTIMATION_PHRASES) {
            Self::GasEstimationFailed(message.to_string())
        } else if matches(REVERT_PHRASES) {
            Self::Reverted
        } else if matches(TIMEOUT_PHRASES) {
            Self::TimedOut
        } else {
            Self::Unknown(message.to_string())
        }
    }

    /// Short machine-readable kind, used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserRejected => "user_rejected",
            Self::InsufficientFunds => "insufficient_funds",
            Self::NonceConflict => "nonce_conflict",
            Self::GasEstimationFailed(_) => "gas_estimation_failed",
            Self::Reverted => "reverted",
            Self::TimedOut => "timed_out",
            Self::WalletNotConnected => "wallet_not_connected",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Message suitable for a status view.
    pub fn user_message(&self) -> String {
        match self {
            Self::UserRejected => "You rejected the transaction in your wallet.".to_string(),
            Self::InsufficientFunds => {
                "Your balance does not cover the amount plus network fees.".to_string()
            }
            Self::NonceConflict => {
                "Another transaction from this account is pending. Wait for it or replace it."
                    .to_string()
            }
            Self::GasEstimationFailed(_) => {
                "The network could not estimate gas. The transaction would likely fail.".to_string()
            }
            Self::Reverted => "The transaction was included but reverted.".to_string(),
            Self::TimedOut => "The network did not confirm the transaction in time.".to_string(),
            Self::WalletNotConnected => "Connect a wallet to send transactions.".to_string(),
            Self::InvalidConfig(msg) | Self::Unknown(msg) => msg.clone(),
        }
    }
}

impl From<ChainError> for TxError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rejected(_) => Self::UserRejected,
            ChainError::NoSigner => Self::WalletNotConnected,
            ChainError::Timeout(_) => Self::TimedOut,
            other => Self::classify(&other.to_string()),
        }
    }
}
