//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, confirmations >= 1)
//! - Check the chain is one the network catalog knows
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::AppConfig;
use crate::networks;

/// One failed check, with the offending field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.chain;
    let tx = &config.transaction;

    if chain.rpc_url.trim().is_empty() {
        errors.push(ValidationError::new("chain.rpc_url", "must not be empty"));
    } else if let Err(e) = chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("invalid URL '{}': {}", chain.rpc_url, e),
        ));
    }

    for (i, failover) in chain.failover_urls.iter().enumerate() {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                &format!("chain.failover_urls[{}]", i),
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }

    if networks::by_id(chain.chain_id).is_none() {
        errors.push(ValidationError::new(
            "chain.chain_id",
            format!("unsupported chain {}", chain.chain_id),
        ));
    }

    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if tx.confirmations == 0 {
        errors.push(ValidationError::new("transaction.confirmations", "must be >= 1"));
    }
    if tx.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "transaction.receipt_poll_interval_ms",
            "must be > 0",
        ));
    }
    if tx.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transaction.receipt_timeout_secs",
            "must be > 0",
        ));
    }
    if tx.backoff_base_ms > tx.backoff_max_ms {
        errors.push(ValidationError::new(
            "transaction.backoff_base_ms",
            "must not exceed backoff_max_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
