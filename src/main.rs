//! amz-price-alert - Amazon price-drop tracker with Telegram alerts
//!
//! Meant to be invoked on a schedule: each invocation is one pass over the
//! catalog, after which the process exits.

use amz_price_alert::amazon::regions::Region;
use amz_price_alert::commands::{CheckCommand, RunCommand};
use amz_price_alert::config::{Config, OutputFormat};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-price-alert",
    version,
    about = "Checks Amazon prices and posts price drops to Telegram",
    long_about = "Checks every product in the catalog, alerts a Telegram chat when a price \
                  falls below its recorded baseline, and saves the new baselines. \
                  Requires BOT_TOKEN and CHANNEL_ID."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Product catalog (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Baseline price state file (JSON)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Storefront for URLs on unrecognised hosts
    #[arg(short, long, global = true)]
    region: Option<Region>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "AMZ_PROXY")]
    proxy: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check all catalog products, alert on drops, save baselines (default)
    Run,

    /// Print the current price of one product page without saving or alerting
    #[command(alias = "c")]
    Check {
        /// Product page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let output = RunCommand::new(config).execute().await?;
            println!("{}", output);
        }

        Commands::Check { url } => {
            let output = CheckCommand::new(config).execute(&url).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
