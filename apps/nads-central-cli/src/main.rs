use clap::{Parser, Subcommand};
use nads_central_gate::{Rendered, Supervisor};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use config::{AppConfig, Overrides};
use error::CliResult;

#[derive(Parser)]
#[command(name = "nads-central")]
#[command(about = "Nads Central CLI - NFT-gated membership on Monad testnet")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "NADS_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hosted backend URL
    #[arg(long, global = true, env = "NADS_BACKEND_URL")]
    backend_url: Option<String>,

    /// Hosted backend public key
    #[arg(long, global = true, env = "NADS_BACKEND_KEY", hide_env_values = true)]
    backend_key: Option<String>,

    /// Chain RPC URL
    #[arg(long, global = true, env = "NADS_RPC_URL")]
    rpc_url: Option<String>,

    /// RPC provider client identifier
    #[arg(long, global = true, env = "NADS_CLIENT_ID")]
    client_id: Option<String>,

    /// SQL database URL
    #[arg(long, global = true, env = "NADS_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a wallet and report where the gate sends it
    CheckAccess {
        /// Wallet address
        wallet: String,

        /// Route the wallet connects from
        #[arg(short, long, default_value = "/")]
        from: String,

        /// Attempts before giving up on a faulted check
        #[arg(short, long, default_value = "1")]
        attempts: u32,
    },

    /// Keep re-reading the balance and report route changes until Ctrl-C
    Watch {
        /// Wallet address
        wallet: String,

        /// Seconds between balance refreshes
        #[arg(short, long, default_value = "30")]
        interval: u64,
    },

    /// Show or edit a member profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Show the members dashboard for a wallet
    Dashboard {
        /// Wallet address
        wallet: String,
    },

    /// Show the points leaderboard
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: u64,
    },

    /// Apply schema migrations to the configured SQL database
    Migrate,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile stored for a wallet
    Show {
        /// Wallet address
        wallet: String,
    },

    /// Update username and/or avatar, creating the profile if needed
    Update {
        /// Wallet address
        wallet: String,

        /// New username
        #[arg(short, long)]
        username: Option<String>,

        /// New avatar URL
        #[arg(short, long)]
        avatar_url: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut supervisor = Supervisor::application();
    match supervisor.run_async(run(cli)).await {
        Rendered::View(code) => code,
        Rendered::Fallback(fallback) => {
            commands::print_fallback(&fallback);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&Overrides {
        backend_url: cli.backend_url,
        backend_key: cli.backend_key,
        rpc_url: cli.rpc_url,
        client_id: cli.client_id,
        database_url: cli.database_url,
    })?;

    match cli.command {
        Commands::CheckAccess {
            wallet,
            from,
            attempts,
        } => commands::check_access::execute(&config, wallet, from, attempts).await,
        Commands::Watch { wallet, interval } => {
            commands::watch::execute(&config, wallet, interval).await
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show { wallet } => commands::profile::show(&config, wallet).await,
            ProfileCommands::Update {
                wallet,
                username,
                avatar_url,
            } => commands::profile::update(&config, wallet, username, avatar_url).await,
        },
        Commands::Dashboard { wallet } => commands::dashboard::execute(&config, wallet).await,
        Commands::Leaderboard { limit } => commands::leaderboard::execute(&config, limit).await,
        Commands::Migrate => commands::migrate::execute(&config).await,
    }
}
