use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;
mod db;

use commands::{
    ConfigCommand, HealthCommand, IdentityCommand, ItemCommand, SyncCommand, TryOnCommand,
};
use config::Config;
use context::AppContext;

#[derive(Parser)]
#[command(name = "cloakroom")]
#[command(version)]
#[command(about = "Closet sync, uploads and virtual try-on from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log requests and cache activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the catalog service
    Health(HealthCommand),

    /// Manage the owner identity of this installation
    Identity(IdentityCommand),

    /// Sync the closet with the catalog service
    Sync(SyncCommand),

    /// Manage closet items
    Item(ItemCommand),

    /// Render an outfit try-on
    Tryon(TryOnCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Health(cmd)) => {
            let ctx = AppContext::open(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Identity(cmd)) => {
            let mut ctx = AppContext::open(&config).await?;
            cmd.run(&mut ctx).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let ctx = AppContext::open(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Item(cmd)) => {
            let ctx = AppContext::open(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Tryon(cmd)) => {
            let ctx = AppContext::open(&config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "cloakroom=debug,cloakroom_core=debug"
    } else {
        "cloakroom=warn,cloakroom_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
