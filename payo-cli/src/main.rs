//! Payo command line client
//!
//! Create and follow crypto invoices priced in soles, and keep a small
//! personal finance log.

mod commands;
mod config;
mod shutdown;
mod state;
mod views;

use clap::Parser;
use commands::Command;
use config::{ConfigLoader, Overrides};
use payo_core::backend::ApiBackend;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Payo - crypto invoicing client
#[derive(Parser, Debug)]
#[command(name = "payo")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "PAYO_CONFIG", default_value = "./payo.toml")]
    config: PathBuf,

    /// Backend to talk to (mock or live), overriding the config file
    #[arg(long, env = "PAYO_BACKEND")]
    backend: Option<ApiBackend>,

    /// Base URL of the live backend, overriding the config file
    #[arg(long, env = "PAYO_BASE_URL")]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::debug!("Starting payo v{}", env!("CARGO_PKG_VERSION"));

    let loader = ConfigLoader::new(
        &args.config,
        Overrides {
            backend: args.backend,
            base_url: args.base_url,
        },
    );

    commands::run(args.command, &loader).await
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
