//! Supported network catalog.
//!
//! Static metadata for the chains the transfer flow can target: native
//! currency, block explorer and display attributes. Add or remove entries in
//! [`NETWORKS`] to change what is available; the first entry is the default.

use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

/// Native currency of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Block explorer of a chain. An empty `url` means none is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockExplorer {
    pub name: &'static str,
    pub url: &'static str,
}

/// One supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Network {
    pub id: u64,
    pub name: &'static str,
    pub native_currency: NativeCurrency,
    pub explorer: BlockExplorer,
    /// Display color (hex).
    pub color: &'static str,
    pub is_testnet: bool,
}

const ETHER: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

pub const NETWORKS: &[Network] = &[
    Network {
        id: 1,
        name: "Ethereum",
        native_currency: ETHER,
        explorer: BlockExplorer {
            name: "Etherscan",
            url: "https://etherscan.io",
        },
        color: "#627EEA",
        is_testnet: false,
    },
    Network {
        id: 84532,
        name: "Base Sepolia",
        native_currency: NativeCurrency {
            name: "Sepolia Ether",
            symbol: "ETH",
            decimals: 18,
        },
        explorer: BlockExplorer {
            name: "Basescan",
            url: "https://sepolia.basescan.org",
        },
        color: "#0052FF",
        is_testnet: true,
    },
    Network {
        id: 8453,
        name: "Base",
        native_currency: ETHER,
        explorer: BlockExplorer {
            name: "Basescan",
            url: "https://basescan.org",
        },
        color: "#0052FF",
        is_testnet: false,
    },
    Network {
        id: 56,
        name: "BNB Smart Chain",
        native_currency: NativeCurrency {
            name: "BNB",
            symbol: "BNB",
            decimals: 18,
        },
        explorer: BlockExplorer {
            name: "BscScan",
            url: "https://bscscan.com",
        },
        color: "#F0B90B",
        is_testnet: false,
    },
    Network {
        id: 31337,
        name: "Anvil",
        native_currency: ETHER,
        explorer: BlockExplorer {
            name: "Local Explorer",
            url: "",
        },
        color: "#888888",
        is_testnet: true,
    },
];

pub fn all() -> &'static [Network] {
    NETWORKS
}

pub fn by_id(chain_id: u64) -> Option<Network> {
    NETWORKS.iter().find(|n| n.id == chain_id).copied()
}

pub fn default_network() -> Network {
    NETWORKS[0]
}

impl Network {
    /// Explorer page for a transaction.
    pub fn tx_url(&self, hash: &TxHash) -> Option<String> {
        if self.explorer.url.is_empty() {
            return None;
        }
        Some(format!("{}/tx/{}", self.explorer.url.trim_end_matches('/'), hash))
    }

    /// Explorer page for an account.
    pub fn address_url(&self, address: &Address) -> Option<String> {
        if self.explorer.url.is_empty() {
            return None;
        }
        Some(format!(
            "{}/address/{}",
            self.explorer.url.trim_end_matches('/'),
            address
        ))
    }

    /// Format a smallest-unit amount, keeping at most `precision` decimals
    /// and dropping trailing zeros.
    pub fn format_value(&self, value: U256, precision: usize) -> String {
        let full = match format_units(value, self.native_currency.decimals) {
            Ok(s) => s,
            Err(_) => return value.to_string(),
        };
        let Some((whole, frac)) = full.split_once('.') else {
            return full;
        };
        let frac = frac[..frac.len().min(precision)].trim_end_matches('0');
        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, frac)
        }
    }

    /// Parse a human amount ("0.1") into smallest units.
    pub fn parse_value(&self, amount: &str) -> Result<U256, String> {
        match parse_units(amount.trim(), self.native_currency.decimals) {
            Ok(ParseUnits::U256(value)) => Ok(value),
            Ok(ParseUnits::I256(_)) => Err(format!("Negative amount '{}'", amount)),
            Err(e) => Err(format!("Invalid amount '{}': {}", amount, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn test_lookup() {
        assert_eq!(default_network().id, 1);
        assert_eq!(by_id(8453).unwrap().name, "Base");
        assert_eq!(by_id(56).unwrap().native_currency.symbol, "BNB");
        assert!(by_id(999_999).is_none());
        assert!(all().iter().any(|n| n.is_testnet));
    }

    #[test]
    fn test_tx_url() {
        let hash = b256!("00000000000000000000000000000000000000000000000000000000000000ff");
        let url = by_id(1).unwrap().tx_url(&hash).unwrap();
        assert!(url.starts_with("https://etherscan.io/tx/0x"));
        assert!(by_id(31337).unwrap().tx_url(&hash).is_none());
    }

    #[test]
    fn test_address_url() {
        let account = address!("00000000000000000000000000000000000000aa");
        assert_eq!(
            by_id(8453).unwrap().address_url(&account).unwrap(),
            format!("https://basescan.org/address/{}", account)
        );
        assert!(by_id(31337).unwrap().address_url(&account).is_none());
    }

    #[test]
    fn test_format_value() {
        let eth = default_network();
        let one_and_a_bit = U256::from(1_234_567_000_000_000_000u128);
        assert_eq!(eth.format_value(one_and_a_bit, 4), "1.2345");
        assert_eq!(eth.format_value(U256::from(10).pow(U256::from(18)), 4), "1");
        assert_eq!(eth.format_value(U256::ZERO, 4), "0");
    }

    #[test]
    fn test_parse_value() {
        let eth = default_network();
        assert_eq!(
            eth.parse_value("0.1").unwrap(),
            U256::from(100_000_000_000_000_000u128)
        );
        assert!(eth.parse_value("abc").is_err());
        assert!(eth.parse_value("-1").is_err());
    }
}
