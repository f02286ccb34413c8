//! Wave Portal CLI
//!
//! One-shot commands against the WavePortal contract:
//! - List every wave
//! - Send a wave
//! - Show the node's accounts
//! - Follow new waves as they are mined
//! - Generate a config file

use std::path::PathBuf;
use std::rc::Rc;

use alloy_primitives::Address;
use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};

use wave_portal::config::generate_default_config;
use wave_portal::driver::TokioTimer;
use wave_portal::shell::format;
use wave_portal::{
    Config, ContractGateway, ContractHandle, FeedState, HttpProvider, SessionState, WalletSession,
    WaveRecord,
};

#[derive(Parser)]
#[command(name = "wave-portal-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "One-shot commands for the WavePortal contract")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the config file
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every wave, newest first
    Feed,

    /// Send a wave and wait until it is mined
    Wave {
        /// Message to send
        message: String,
    },

    /// Show the accounts the node will sign with
    Accounts,

    /// Print new waves as they arrive (Ctrl-C to stop)
    Watch,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.rpc_url.clone() {
        config.rpc.url = url;
    }
    wave_portal::logging::init(&config.logging).context("failed to open log file")?;

    let provider = HttpProvider::new(&config.rpc.url, config.rpc.request_timeout())?;
    let session = WalletSession::new(Some(provider.clone()));
    let gateway = ContractGateway::new(provider, Rc::new(TokioTimer), config.contract.clone());

    match cli.command {
        Commands::Feed => {
            let handle = gateway.open(reader_account(&session).await);
            let mut feed = FeedState::new();
            feed.initialize(handle.fetch_all_records().await?);
            print_records(feed.records(), &cli.format)?;
        }

        Commands::Wave { message } => {
            if message.trim().is_empty() {
                bail!("message is empty");
            }
            let account = match session.request_connection().await? {
                SessionState::Connected(account) => account,
                other => bail!("cannot wave: wallet is {other}"),
            };

            println!("Waving from {account}...");
            let receipt = gateway.open(account).submit_wave(&message).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                println!("Mined {}", receipt.transaction_hash);
                if let Some(block) = receipt.block_number {
                    println!("  Block:    {block}");
                }
                if let Some(gas) = receipt.gas_used {
                    println!("  Gas used: {gas}");
                }
            }
        }

        Commands::Accounts => {
            let state = session.probe_existing_session().await?;
            if cli.format == "json" {
                println!("{}", serde_json::json!({ "account": state.account() }));
            } else {
                println!("Node {}: {}", config.rpc.url, state);
            }
        }

        Commands::Watch => {
            let handle = gateway.open(reader_account(&session).await);
            watch(&handle, &config, &cli.format).await?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{content}"),
            }
        }
    }

    Ok(())
}

/// First authorized account, or the zero address for plain reads
async fn reader_account(session: &WalletSession<HttpProvider>) -> Address {
    match session.probe_existing_session().await {
        Ok(state) => state.account().unwrap_or_default(),
        Err(e) => {
            tracing::debug!(error = %e, "No account for reads");
            Address::ZERO
        }
    }
}

async fn watch(
    handle: &ContractHandle<HttpProvider>,
    config: &Config,
    format: &str,
) -> anyhow::Result<()> {
    let subscription = handle.subscribe_new_records().await?;
    eprintln!("Watching {} for new waves...", handle.contract());

    let mut ticker = tokio::time::interval(config.contract.poll_interval());
    let mut feed = FeedState::new();
    feed.initialize(Vec::new());

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            _ = ticker.tick() => {
                match handle.poll_subscription(&subscription).await {
                    Ok(records) => {
                        let fresh: Vec<WaveRecord> = records
                            .into_iter()
                            .filter(|r| feed.append(r.clone()))
                            .collect();
                        if !fresh.is_empty() {
                            print_records(&fresh, format)?;
                        }
                    }
                    Err(e) => break Err(e),
                }
            }
        }
    };

    handle.unsubscribe(subscription).await?;
    Ok(result?)
}

fn print_records(records: &[WaveRecord], format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        _ => {
            if records.is_empty() {
                println!("No waves yet.");
                return Ok(());
            }
            let now = Utc::now();
            println!("{:<42} {:<24} {}", "From", "When", "Message");
            println!("{}", "-".repeat(90));
            for record in records {
                println!(
                    "{:<42} {:<24} {}",
                    record.sender.to_string(),
                    format::relative(record.timestamp, now),
                    record.message
                );
            }
        }
    }
    Ok(())
}
