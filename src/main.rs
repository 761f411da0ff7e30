//! txflow command line.
//!
//! Drives a native-currency transfer through the transaction lifecycle
//! controller against a JSON-RPC endpoint:
//!
//! ```text
//! transfer: parse → submit (estimate) → prompt → confirm (send + receipt)
//!           → on failure: prompt to retry while the controller allows it
//! ```
//!
//! The signing key is read from `TXFLOW_PRIVATE_KEY`.

use alloy::primitives::utils::format_units;
use alloy::primitives::{TxHash, U256};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use txflow::chain::{ChainContext, Wallet};
use txflow::config::{load_config, validate_config, AppConfig};
use txflow::networks::{self, Network};
use txflow::observability::logging::init_logging;
use txflow::transaction::{GasQuote, ReceiptPoller, TransactionConfig, TransferFlow, TxError};

#[derive(Parser)]
#[command(name = "txflow")]
#[command(about = "Send and track native-currency transfers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `chain.rpc_url`.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override `chain.chain_id`.
    #[arg(long)]
    chain_id: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks
    Networks {
        #[arg(long)]
        json: bool,
    },
    /// Estimate gas and fee for a transfer
    Estimate {
        #[arg(long)]
        to: String,
        /// Amount in the network's native currency, e.g. 0.1
        #[arg(long)]
        amount: String,
    },
    /// Send a transfer and wait for its receipt
    Transfer {
        #[arg(long)]
        to: String,
        /// Amount in the network's native currency, e.g. 0.1
        #[arg(long)]
        amount: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Confirmations to wait for (defaults to config)
        #[arg(long)]
        confirmations: Option<u64>,
    },
    /// Wait for an already broadcast transaction
    Watch {
        hash: String,
        #[arg(long)]
        confirmations: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.chain.rpc_url = rpc_url;
    }
    if let Some(chain_id) = cli.chain_id {
        config.chain.chain_id = chain_id;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config: {}", error);
        }
        return Err("invalid configuration".into());
    }

    init_logging(&config.observability.log_level);
    tracing::debug!(chain_id = config.chain.chain_id, rpc_url = %config.chain.rpc_url, "Configuration ready");

    match cli.command {
        Commands::Networks { json } => list_networks(json)?,
        Commands::Estimate { to, amount } => estimate(&config, &to, &amount).await?,
        Commands::Transfer {
            to,
            amount,
            yes,
            confirmations,
        } => transfer(&config, &to, &amount, yes, confirmations).await?,
        Commands::Watch {
            hash,
            confirmations,
        } => watch(&config, &hash, confirmations).await?,
    }

    Ok(())
}

fn list_networks(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(networks::all())?);
        return Ok(());
    }
    for network in networks::all() {
        println!(
            "{:>8}  {:<16} {:<4} {}{}",
            network.id,
            network.name,
            network.native_currency.symbol,
            network.explorer.url,
            if network.is_testnet { "  (testnet)" } else { "" }
        );
    }
    Ok(())
}

fn parse_transfer(
    network: &Network,
    to: &str,
    amount: &str,
) -> Result<TransactionConfig, Box<dyn std::error::Error>> {
    let value = network.parse_value(amount)?;
    if value.is_zero() {
        return Err("Amount must be greater than zero".into());
    }
    Ok(TransactionConfig::parse(to, value)?)
}

async fn estimate(
    config: &AppConfig,
    to: &str,
    amount: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Wallet::from_env(config.chain.chain_id).ok();
    let context = ChainContext::connect(config, wallet.as_ref()).await?;
    let tx = parse_transfer(context.network(), to, amount)?;

    let mut flow = TransferFlow::from_context(&context, &config.transaction);
    let quote = flow.submit(tx).await?;
    print_quote(context.network(), &quote);
    flow.cancel();
    Ok(())
}

async fn transfer(
    config: &AppConfig,
    to: &str,
    amount: &str,
    yes: bool,
    confirmations: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Wallet::from_env(config.chain.chain_id)?;
    let context = ChainContext::connect(config, Some(&wallet)).await?;
    let network = *context.network();
    let tx = parse_transfer(&network, to, amount)?;

    let mut flow = TransferFlow::from_context(&context, &config.transaction)
        .with_confirmations(confirmations.unwrap_or(config.transaction.confirmations));

    println!(
        "Sending {} {} from {} to {}",
        network.format_value(tx.value(), 6),
        network.native_currency.symbol,
        wallet.address(),
        tx.to()
    );
    if let Some(url) = network.address_url(&wallet.address()) {
        println!("  {}", url);
    }

    let mut quote = flow.submit(tx).await;
    let failure = loop {
        let error = match quote {
            Ok(q) => {
                print_quote(&network, &q);
                if !yes && !prompt("Send this transaction?")? {
                    flow.cancel();
                    println!("Cancelled.");
                    return Ok(());
                }
                match flow.confirm().await {
                    Ok(receipt) => {
                        println!(
                            "Confirmed in block {} ({} confirmation{})",
                            receipt.block_number,
                            receipt.confirmations,
                            if receipt.confirmations == 1 { "" } else { "s" }
                        );
                        print_link(&network, &receipt.hash);
                        break None;
                    }
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };
        print_failure(&network, &flow, &error);

        if yes || !flow.controller().can_retry() || !prompt("Retry?")? {
            break Some(error);
        }
        match flow.retry().await {
            Some(next) => quote = next,
            None => break Some(error),
        }
    };

    flow.close();
    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

async fn watch(
    config: &AppConfig,
    hash: &str,
    confirmations: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let hash = TxHash::from_str(hash.trim())?;
    let context = ChainContext::connect(config, None).await?;
    let target = confirmations.unwrap_or(config.transaction.confirmations);

    let mut poller = ReceiptPoller::new(context.client(), &config.transaction);
    match poller.wait(hash, target).await {
        Some(Ok(receipt)) => {
            println!(
                "Mined in block {} with {} confirmation(s)",
                receipt.block_number, receipt.confirmations
            );
            print_link(context.network(), &hash);
        }
        Some(Err(e)) => {
            eprintln!("{}", e.user_message());
            print_link(context.network(), &hash);
            return Err(e.into());
        }
        None => {}
    }
    Ok(())
}

fn print_quote(network: &Network, quote: &GasQuote) {
    println!("  Gas limit:     {}", quote.gas);
    match quote.gas_price {
        Some(price) => println!("  Gas price:     {} gwei", format_gwei(price)),
        None => println!("  Gas price:     unavailable"),
    }
    if let Some(cost) = quote.cost {
        println!(
            "  Network fee:   ~{} {}",
            network.format_value(cost, 6),
            network.native_currency.symbol
        );
    }
}

/// Wei to gwei without losing sub-gwei precision, trailing zeros dropped.
fn format_gwei(wei: u128) -> String {
    match format_units(U256::from(wei), "gwei") {
        Ok(s) => match s.split_once('.') {
            Some((whole, frac)) if frac.trim_end_matches('0').is_empty() => whole.to_string(),
            Some((whole, frac)) => format!("{}.{}", whole, frac.trim_end_matches('0')),
            None => s,
        },
        Err(_) => format!("{} wei", wei),
    }
}

fn print_failure(network: &Network, flow: &TransferFlow, error: &TxError) {
    eprintln!("Transaction failed: {}", error.user_message());
    if let Some(hash) = flow.controller().hash() {
        print_link(network, &hash);
    }
}

fn print_link(network: &Network, hash: &TxHash) {
    match network.tx_url(hash) {
        Some(url) => println!("  {}", url),
        None => println!("  Transaction: {}", hash),
    }
}

fn prompt(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
