use crate::config::{ConfigLoader, RuntimeConfig};
use crate::views;
use anyhow::Context;
use clap::Subcommand;
use payo_sdk::client::verify_webhook;
use payo_sdk::objects::{InvoiceStatus, Method, WebhookEventType, WebhookPayload};
use payo_sdk::rules::{convert_pen, crypto_config, status_display};
use payo_sdk::signature::{sign_payload, SIGNATURE_HEADER};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change settings and save them to the config file
    Set {
        #[arg(long)]
        btc_address: Option<String>,
        #[arg(long)]
        btc_xpub: Option<String>,
        #[arg(long)]
        ln_endpoint: Option<String>,
        #[arg(long)]
        evm_address: Option<String>,
        #[arg(long)]
        webhook_url: Option<String>,
        #[arg(long)]
        webhook_secret: Option<String>,
        /// 15, 30, 60 or 1440
        #[arg(long)]
        expiry_min: Option<u32>,
        /// 0, 1, 3 or 6
        #[arg(long)]
        conf_target: Option<u32>,
        /// 0, 1, 2 or 5
        #[arg(long)]
        tolerance_pct: Option<u32>,
    },
    /// Print a sample webhook signed with the configured secret
    TestWebhook {
        #[arg(long, default_value = "inv_test")]
        invoice_id: String,
        #[arg(long, default_value = "confirmed")]
        status: InvoiceStatus,
        #[arg(long, default_value = "BTC_LN")]
        method: Method,
    },
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommand {
    /// Verify a webhook body against its X-Signature header value
    Verify {
        /// Hex signature from the X-Signature header
        #[arg(long)]
        signature: String,
        /// Secret to check against; defaults to the configured one
        #[arg(long, env = "PAYO_WEBHOOK_SECRET")]
        secret: Option<String>,
        /// File holding the raw body, or - for stdin
        body: PathBuf,
    },
}

pub fn run(
    command: SettingsCommand,
    config: &RuntimeConfig,
    loader: &ConfigLoader,
) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => println!("{}", views::settings(&config.settings)),
        SettingsCommand::Set {
            btc_address,
            btc_xpub,
            ln_endpoint,
            evm_address,
            webhook_url,
            webhook_secret,
            expiry_min,
            conf_target,
            tolerance_pct,
        } => {
            let mut settings = config.settings.clone();
            // An empty value clears the field.
            let apply = |slot: &mut Option<String>, value: Option<String>| {
                if let Some(value) = value {
                    *slot = Some(value).filter(|v| !v.is_empty());
                }
            };
            apply(&mut settings.btc_address, btc_address);
            apply(&mut settings.btc_xpub, btc_xpub);
            apply(&mut settings.ln_endpoint, ln_endpoint);
            apply(&mut settings.evm_address, evm_address);
            apply(&mut settings.webhook_url, webhook_url);
            apply(&mut settings.webhook_secret, webhook_secret);
            if let Some(expiry_min) = expiry_min {
                settings.default_expiry_min = expiry_min;
            }
            if let Some(conf_target) = conf_target {
                settings.conf_target = conf_target;
            }
            if let Some(tolerance_pct) = tolerance_pct {
                settings.tolerance_pct = tolerance_pct;
            }

            loader.save_settings(&settings)?;
            println!("{}", views::settings(&settings));
        }
        SettingsCommand::TestWebhook {
            invoice_id,
            status,
            method,
        } => {
            let secret = config
                .settings
                .webhook_secret
                .as_deref()
                .context("no webhook secret configured (payo settings set --webhook-secret ...)")?;
            let payload = sample_webhook(invoice_id, status, method);
            let signature = sign_payload(&payload, secret.as_bytes())?;
            println!("{}", views::signed_webhook(SIGNATURE_HEADER, &signature, &payload));
        }
    }
    Ok(())
}

pub fn verify(command: WebhookCommand, config: &RuntimeConfig) -> anyhow::Result<()> {
    let WebhookCommand::Verify {
        signature,
        secret,
        body,
    } = command;

    let secret = secret
        .or_else(|| config.settings.webhook_secret.clone())
        .context("no webhook secret given or configured")?;
    let body = read_body(&body)?;

    let payload: WebhookPayload = verify_webhook(&signature, &body, secret.as_bytes())?;
    println!(
        "Firma válida: {} → {} ({})",
        payload.invoice_id,
        status_display(payload.status).label,
        payload.method
    );
    Ok(())
}

fn read_body(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// The payload the backend would send for a 150 PEN invoice.
fn sample_webhook(invoice_id: String, status: InvoiceStatus, method: Method) -> WebhookPayload {
    let decimals = crypto_config(method).decimals as usize;
    let expected = format!("{:.*}", decimals, convert_pen(Decimal::new(150, 0), method));
    let received = match status {
        InvoiceStatus::Pending | InvoiceStatus::Expired => "0".to_owned(),
        _ => expected.clone(),
    };
    WebhookPayload {
        event_type: WebhookEventType::InvoiceUpdated,
        invoice_id,
        status,
        method,
        tx_hash: (received != "0").then(|| "abc123".to_owned()),
        amount_expected: expected,
        amount_received: received,
        received_at: OffsetDateTime::now_utc(),
    }
}
