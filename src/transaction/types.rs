//! Transaction value types shared by the controller and its helpers.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transaction::error::TxError;

/// Gas pricing for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasPricing {
    /// Legacy single gas price in wei.
    Legacy { gas_price: u128 },
    /// EIP-1559 fee cap pair in wei.
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

/// One pending transfer.
///
/// Immutable once built: the `with_*` methods consume the value and return a
/// new one, so each attempt owns its own config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    to: Address,
    value: U256,
    data: Option<Bytes>,
    gas_limit: Option<u64>,
    pricing: Option<GasPricing>,
}

impl TransactionConfig {
    /// Create a plain value transfer.
    pub fn new(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            data: None,
            gas_limit: None,
            pricing: None,
        }
    }

    /// Parse a hex destination address and build a transfer.
    pub fn parse(to: &str, value: U256) -> Result<Self, TxError> {
        let to = Address::from_str(to.trim())
            .map_err(|e| TxError::InvalidConfig(format!("Invalid address '{}': {}", to, e)))?;
        Ok(Self::new(to, value))
    }

    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.pricing = Some(GasPricing::Legacy { gas_price });
        self
    }

    pub fn with_fees(mut self, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        self.pricing = Some(GasPricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        });
        self
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    pub fn pricing(&self) -> Option<GasPricing> {
        self.pricing
    }
}

/// Lifecycle status of the controlled transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Idle,
    /// Waiting for the user to approve.
    Confirming,
    /// Approved; broadcasting or waiting for inclusion.
    Pending,
    Success,
    Error,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Confirming => "confirming",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of the controlled transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionState {
    pub status: TransactionStatus,
    /// Present once the transaction has been broadcast.
    pub hash: Option<TxHash>,
    pub error: Option<TxError>,
    /// Blocks observed since inclusion.
    pub confirmations: u64,
}

/// Receipt status reported by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Minimal view of a mined transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptInfo {
    pub block_number: u64,
    pub status: ReceiptStatus,
}
