mod commands;
mod config;

use clap::{Parser, Subcommand};
use raffle_core::{Address, GameClient, RaffleError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raffle")]
#[command(about = "Random winner lottery game client")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Wallet JSON-RPC endpoint
    #[arg(long, global = true, env = "RAFFLE_RPC_URL")]
    rpc_url: Option<String>,

    /// Game contract address
    #[arg(long, global = true, env = "RAFFLE_CONTRACT")]
    contract: Option<Address>,

    /// Indexing service endpoint
    #[arg(long, global = true, env = "RAFFLE_SUBGRAPH_URL")]
    subgraph_url: Option<String>,

    /// Expected chain id
    #[arg(long, global = true, env = "RAFFLE_CHAIN_ID")]
    chain_id: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current round and the action available to you
    Status,
    /// Follow the round live until interrupted
    Watch,
    /// Start a new round (contract owner only)
    Start(commands::StartArgs),
    /// Join the running round by paying its entry fee
    Join(commands::JoinArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "raffle={},raffle_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let overrides = config::Overrides {
        rpc_url: cli.rpc_url,
        contract: cli.contract,
        subgraph_url: cli.subgraph_url,
        chain_id: cli.chain_id,
    };
    let game_config = config::load(cli.config.as_deref(), overrides)?;
    let network_name = game_config.network_name.clone();

    let result = match GameClient::new(game_config) {
        Ok(client) => match cli.command {
            Commands::Status => commands::show_status(&client).await,
            Commands::Watch => commands::watch(client).await,
            Commands::Start(args) => commands::start_round(&client, args).await,
            Commands::Join(args) => commands::join_round(&client, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e {
            RaffleError::WrongNetwork { expected, actual } => {
                eprintln!("==============================================");
                eprintln!("  Change network to {}", network_name);
                eprintln!("  Wallet is on chain {}, game needs chain {}", actual, expected);
                eprintln!("==============================================");
            }
            RaffleError::UserRejected => {
                eprintln!("Error: Request was rejected in the wallet");
            }
            RaffleError::ActionUnavailable { state } => {
                eprintln!("Error: Not possible right now, {}", state);
                eprintln!("Use 'raffle status' to see what you can do");
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
