//! Process-wide chain context.
//!
//! Built once at startup from [`AppConfig`] and passed explicitly to whatever
//! needs the chain; there is no global provider.

use std::sync::Arc;

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainError, ChainResult};
use crate::chain::wallet::Wallet;
use crate::config::AppConfig;
use crate::networks::{self, Network};

/// Network metadata plus a connected client.
#[derive(Debug, Clone)]
pub struct ChainContext {
    network: Network,
    client: Arc<ChainClient>,
}

impl ChainContext {
    /// Connect to the configured chain, attaching `wallet` when given.
    pub async fn connect(config: &AppConfig, wallet: Option<&Wallet>) -> ChainResult<Self> {
        let network = networks::by_id(config.chain.chain_id)
            .ok_or(ChainError::UnsupportedChain(config.chain.chain_id))?;

        let mut client = ChainClient::new(config.chain.clone()).await?;
        if let Some(wallet) = wallet {
            client = client.with_wallet(wallet)?;
        }

        tracing::info!(
            network = network.name,
            chain_id = network.id,
            signer = wallet.map(|w| w.address().to_string()).unwrap_or_default(),
            "Chain context ready"
        );

        Ok(Self {
            network,
            client: Arc::new(client),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn client(&self) -> Arc<ChainClient> {
        self.client.clone()
    }
}
