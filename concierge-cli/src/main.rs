mod config;
mod customer;
mod support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use concierge_relay::RelayConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Two-party support calls over a WebSocket relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, default_value = concierge_core::utils::DEFAULT_RELAY_BIND)]
        addr: String,
    },

    /// Run the support desk endpoint.
    Support {
        #[arg(long)]
        url: Option<String>,

        /// Answer every incoming call without asking.
        #[arg(long)]
        auto_accept: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a customer endpoint driven by stdin commands.
    Customer {
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay { addr } => {
            println!("{}", format!("Relay listening on {}", addr).green().bold());
            concierge_relay::run(RelayConfig { bind: addr }).await?;
        }

        Commands::Support {
            url,
            auto_accept,
            config,
        } => {
            let config = config::load(config.as_deref(), url)?;
            support::run(config, auto_accept).await?;
        }

        Commands::Customer { url, config } => {
            let config = config::load(config.as_deref(), url)?;
            customer::run(config).await?;
        }
    }

    Ok(())
}
