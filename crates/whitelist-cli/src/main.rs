//! Whitelist dapp terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session against a local node
//! whitelist --rpc-url http://127.0.0.1:8545 --chain-id 31337 --network-name localhost
//!
//! # One-shot queries
//! whitelist status
//! whitelist join
//!
//! # Deploy a whitelist for ten addresses
//! whitelist deploy --artifact artifacts/Whitelist.json --capacity 10
//! ```

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use whitelist_cli::{CliError, JoinOutcome, commands};
use whitelist_core::DappConfig;
use whitelist_proto::Address;
use whitelist_rpc::HttpWallet;

/// Whitelist dapp client
#[derive(Parser, Debug)]
#[command(name = "whitelist")]
#[command(about = "Join and inspect an on-chain whitelist")]
#[command(version)]
struct Args {
    /// JSON-RPC endpoint of a node with unlocked accounts
    #[arg(long, global = true, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Chain id a session may be established on
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    /// Network name shown when the wallet is on another chain
    #[arg(long, global = true)]
    network_name: Option<String>,

    /// Deployed whitelist contract
    #[arg(long, global = true)]
    contract: Option<Address>,

    /// Timeout for connect and read calls
    #[arg(long, global = true)]
    call_timeout_secs: Option<u64>,

    /// Timeout for signing and for confirmation
    #[arg(long, global = true)]
    confirmation_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Run,
    /// Show the whitelist count and the account's membership
    Status,
    /// Join the whitelist with the node's first account
    Join,
    /// Deploy a new whitelist contract
    Deploy {
        /// Compiled contract artifact with a `bytecode` field
        #[arg(long)]
        artifact: PathBuf,

        /// Maximum number of whitelisted addresses
        #[arg(long)]
        capacity: Option<u8>,
    },
}

impl Args {
    fn config(&self) -> DappConfig {
        let mut config = DappConfig::default();
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(name) = &self.network_name {
            config.network_name.clone_from(name);
        }
        if let Some(contract) = self.contract {
            config.contract_address = contract;
        }
        if let Some(secs) = self.call_timeout_secs {
            config.call_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config.confirmation_timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // The interactive session owns stdout.
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "whitelist failed");
            ExitCode::FAILURE
        },
    }
}

async fn execute(args: Args) -> Result<(), CliError> {
    let config = args.config();
    let wallet = HttpWallet::new(args.rpc_url);
    tracing::debug!(?config, "configuration");

    match args.command.unwrap_or(Command::Run) {
        Command::Run => commands::run(&config, wallet).await,
        Command::Status => {
            let status = commands::status(&config, wallet).await?;
            tracing::info!(
                "{} have already joined the Whitelist ({} is {}whitelisted)",
                status.count,
                status.address,
                if status.joined { "" } else { "not " }
            );
            Ok(())
        },
        Command::Join => {
            match commands::join(&config, wallet).await? {
                JoinOutcome::Joined { count, .. } => {
                    tracing::info!("Thanks for joining the Whitelist! {count} have joined");
                },
                JoinOutcome::AlreadyJoined { count } => {
                    tracing::info!("Already on the Whitelist. {count} have joined");
                },
            }
            Ok(())
        },
        Command::Deploy { artifact, capacity } => {
            let capacity = capacity.unwrap_or(config.max_whitelisted_addresses);
            commands::deploy(&config, wallet, &artifact, capacity).await.map(|_| ())
        },
    }
}
