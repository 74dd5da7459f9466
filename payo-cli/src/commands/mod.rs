//! Subcommands. Each one is a screen: fetch through [`AppState`], render
//! with [`crate::views`], print.

pub mod config;
pub mod finance;
pub mod invoice;
pub mod settings;

use crate::config::{ConfigLoader, RuntimeConfig};
use crate::state::AppState;
use crate::views;
use clap::Subcommand;
use payo_core::summary::InvoiceSummary;
use payo_sdk::objects::InvoiceFilters;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend is up
    Health,

    /// Show the backend's exchange rates
    Rates,

    /// Invoice totals per status and the most recent invoices
    Summary {
        /// How many recent invoices to list
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },

    /// Create, inspect and follow invoices
    #[command(subcommand)]
    Invoice(invoice::InvoiceCommand),

    /// Personal income and expense log
    #[command(subcommand)]
    Finance(finance::FinanceCommand),

    /// Merchant settings stored in the config file
    #[command(subcommand)]
    Settings(settings::SettingsCommand),

    /// Check signatures of received webhooks
    #[command(subcommand)]
    Webhook(settings::WebhookCommand),

    /// Manage the config file
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

pub async fn run(command: Command, loader: &ConfigLoader) -> anyhow::Result<()> {
    match command {
        // Works on the file itself, so it must not require it to be valid.
        Command::Config(cmd) => config::run(cmd, loader),
        Command::Finance(cmd) => finance::run(cmd, &load(loader)?),
        Command::Settings(cmd) => settings::run(cmd, &load(loader)?, loader),
        Command::Webhook(cmd) => settings::verify(cmd, &load(loader)?),
        Command::Health => {
            let state = connect(loader)?;
            let health = state.queries.health().await?;
            println!("{}", health.status);
            if !health.is_healthy() {
                anyhow::bail!("backend reported {}", health.status);
            }
            Ok(())
        }
        Command::Rates => {
            let state = connect(loader)?;
            let rates = state.queries.exchange_rates().await?;
            println!("{}", views::rates(&rates));
            Ok(())
        }
        Command::Summary { recent } => {
            let state = connect(loader)?;
            let invoices = state.queries.invoices(&InvoiceFilters::default()).await?;
            let summary = InvoiceSummary::from_invoices(&invoices);
            let shown = &invoices[..recent.min(invoices.len())];
            println!("{}", views::summary(&summary, shown));
            Ok(())
        }
        Command::Invoice(cmd) => invoice::run(cmd, &connect(loader)?).await,
    }
}

fn load(loader: &ConfigLoader) -> anyhow::Result<RuntimeConfig> {
    loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e.into()
    })
}

fn connect(loader: &ConfigLoader) -> anyhow::Result<AppState> {
    Ok(AppState::new(load(loader)?)?)
}
