use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use crate::views;
use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use payo_core::backend::MockInvoiceApi;
use payo_core::events::{invoice_event_channel, InvoiceEvent, PollOutcome};
use payo_core::utils::polling_interval::PollProfile;
use payo_sdk::objects::{CreateInvoiceRequest, InvoiceFilters, InvoiceStatus, Method};
use payo_sdk::rules::rate_preview;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio_stream::StreamExt;
use tracing::{info, warn};

#[derive(Subcommand, Debug)]
pub enum InvoiceCommand {
    /// Create an invoice
    Create {
        /// Amount in soles
        #[arg(long)]
        amount: Decimal,
        /// BTC_LN, BTC or USDC_BASE
        #[arg(long, default_value = "BTC_LN")]
        method: Method,
        #[arg(long)]
        description: Option<String>,
        /// Follow the invoice until it settles
        #[arg(long)]
        watch: bool,
        /// With the mock backend, pay the invoice while watching
        #[arg(long, requires = "watch")]
        simulate: bool,
    },
    /// Show one invoice
    Show {
        id: String,
        /// Show what the payer sees instead of the merchant view
        #[arg(long)]
        payer: bool,
    },
    /// List invoices
    List {
        #[arg(long)]
        status: Option<InvoiceStatus>,
        #[arg(long)]
        method: Option<Method>,
        /// Created at or after (RFC 3339)
        #[arg(long, value_parser = parse_rfc3339)]
        from: Option<OffsetDateTime>,
        /// Created at or before (RFC 3339)
        #[arg(long, value_parser = parse_rfc3339)]
        to: Option<OffsetDateTime>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Poll an invoice until it is confirmed, expired or underpaid
    Watch {
        id: String,
        #[arg(long, value_enum, default_value_t = WatchProfile::Detail)]
        profile: WatchProfile,
        /// With the mock backend, pay the invoice while watching
        #[arg(long)]
        simulate: bool,
    },
    /// Move a mock invoice to another status
    Advance { id: String, status: InvoiceStatus },
}

/// Which screen's refetch interval to use.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WatchProfile {
    /// Payer's payment page
    Payment,
    /// Merchant's invoice detail
    Detail,
}

impl From<WatchProfile> for PollProfile {
    fn from(profile: WatchProfile) -> Self {
        match profile {
            WatchProfile::Payment => PollProfile::PaymentPage,
            WatchProfile::Detail => PollProfile::InvoiceDetail,
        }
    }
}

fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

pub async fn run(command: InvoiceCommand, state: &AppState) -> anyhow::Result<()> {
    match command {
        InvoiceCommand::Create {
            amount,
            method,
            description,
            watch,
            simulate,
        } => {
            if let Some(preview) = rate_preview(amount, method) {
                println!("{preview}");
            }
            let request = CreateInvoiceRequest {
                amount_pen: amount,
                method,
                description,
            };
            let created = state.queries.create_invoice(&request).await?;
            println!("{}", views::created(&created, OffsetDateTime::now_utc()));
            if watch {
                println!();
                watch_invoice(state, created.invoice_id, WatchProfile::Payment, simulate).await?;
            }
        }
        InvoiceCommand::Show { id, payer } => {
            let invoice = state.queries.invoice(&id).await?;
            let now = OffsetDateTime::now_utc();
            if payer {
                println!("{}", views::payment_page(&invoice, now));
            } else {
                if let Err(e) = invoice.validate_timeline() {
                    warn!(invoice_id = %id, error = %e, "Inconsistent invoice timeline");
                }
                println!("{}", views::invoice_detail(&invoice, now));
            }
        }
        InvoiceCommand::List {
            status,
            method,
            from,
            to,
            limit,
            offset,
        } => {
            let filters = InvoiceFilters {
                status,
                method,
                from,
                to,
                limit,
                offset,
            };
            let invoices = state.queries.invoices(&filters).await?;
            println!("{}", views::invoice_table(&invoices));
        }
        InvoiceCommand::Watch {
            id,
            profile,
            simulate,
        } => watch_invoice(state, id, profile, simulate).await?,
        InvoiceCommand::Advance { id, status } => {
            let mock = state
                .mock
                .as_ref()
                .context("advance only works with the mock backend")?;
            let invoice = mock.advance(&id, status).await?;
            println!("{}", views::invoice_detail(&invoice, OffsetDateTime::now_utc()));
        }
    }
    Ok(())
}

async fn watch_invoice(
    state: &AppState,
    invoice_id: String,
    profile: WatchProfile,
    simulate: bool,
) -> anyhow::Result<()> {
    let interval = state.poll_interval(profile.into());
    let simulation = simulator(state, simulate)?
        .map(|mock| tokio::spawn(simulate_payment(mock, invoice_id.clone(), interval * 2)));

    let (events_tx, mut events_rx) = invoice_event_channel();
    let handle = state
        .queries
        .poller(invoice_id.clone(), interval)
        .with_events(events_tx)
        .start();
    let mut updates = handle.updates();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut last_line = String::new();
    let mut stopping = false;
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown, if !stopping => {
                stopping = true;
                handle.stop();
            }

            Some(event) = events_rx.recv() => {
                if let InvoiceEvent::PollingFinished { .. } = event {
                    break;
                }
            }

            Some(update) = updates.next() => {
                let line = views::poll_update(&update, OffsetDateTime::now_utc());
                if !line.is_empty() && line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }

            else => break,
        }
    }

    let last = handle.state();
    let outcome = handle.join().await?;
    if let Some(task) = simulation {
        task.abort();
    }

    match (outcome, last.data) {
        (PollOutcome::Settled(status), Some(invoice)) => {
            info!(invoice_id = %invoice_id, status = %status, "Invoice settled");
            println!();
            println!("{}", views::invoice_detail(&invoice, OffsetDateTime::now_utc()));
        }
        (PollOutcome::Settled(_), None) => {}
        (PollOutcome::Stopped, _) => println!("Seguimiento detenido"),
    }
    Ok(())
}

/// Mock backend to pay through, when `--simulate` was given.
fn simulator(state: &AppState, simulate: bool) -> anyhow::Result<Option<Arc<MockInvoiceApi>>> {
    if !simulate {
        return Ok(None);
    }
    state
        .mock
        .clone()
        .map(Some)
        .context("--simulate only works with the mock backend")
}

/// Pay a mock invoice in two steps, one every `step`.
async fn simulate_payment(mock: Arc<MockInvoiceApi>, invoice_id: String, step: Duration) {
    for next in [InvoiceStatus::Detected, InvoiceStatus::Confirmed] {
        tokio::time::sleep(step).await;
        if let Err(e) = mock.advance(&invoice_id, next).await {
            warn!(invoice_id = %invoice_id, error = %e, "Simulated payment stopped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, Overrides};
    use clap::Parser;
    use payo_core::backend::ApiBackend;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Cli {
        #[command(subcommand)]
        command: InvoiceCommand,
    }

    fn state(backend: ApiBackend) -> AppState {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(
            dir.path().join("payo.toml"),
            Overrides {
                backend: Some(backend),
                base_url: None,
            },
        );
        AppState::new(loader.load().unwrap()).unwrap()
    }

    #[test]
    fn create_watch_does_not_imply_simulate() {
        let cli = Cli::try_parse_from(["payo", "create", "--amount", "150", "--watch"]).unwrap();
        let InvoiceCommand::Create { watch, simulate, .. } = cli.command else {
            panic!("expected create");
        };
        assert!(watch);
        assert!(!simulate);
    }

    #[test]
    fn simulate_on_create_requires_watch() {
        assert!(Cli::try_parse_from(["payo", "create", "--amount", "150", "--simulate"]).is_err());
    }

    #[test]
    fn live_backend_watches_without_simulation() {
        let live = state(ApiBackend::Live);
        assert!(simulator(&live, false).unwrap().is_none());

        let err = simulator(&live, true).unwrap_err();
        assert!(err.to_string().contains("mock backend"), "{err}");
    }

    #[test]
    fn mock_backend_simulates_on_request() {
        let mock = state(ApiBackend::Mock);
        assert!(simulator(&mock, true).unwrap().is_some());
        assert!(simulator(&mock, false).unwrap().is_none());
    }
}
