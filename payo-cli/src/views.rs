//! Plain-text screens.
//!
//! Every function takes `now` where time matters and returns the rendered
//! text, so commands only decide what to fetch and where to print.

use payo_core::finance::{Alert, Budget, MonthlyTotals, Transaction, TxType};
use payo_core::processors::{PollState, QueryStatus};
use payo_core::summary::InvoiceSummary;
use payo_sdk::objects::{
    CreateInvoiceResponse, ExchangeRates, InvoiceWithPayment, UserSettings, WebhookPayload,
};
use payo_sdk::rules::{
    crypto_config, expiration_label, format_crypto_amount, format_pen_amount,
    format_time_remaining, is_expired, required_confirmations, status_display, time_remaining,
};
use time::OffsetDateTime;
use time::macros::format_description;

fn timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| at.to_string())
}

fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<14}{}", format!("{label}:"), value)
}

fn countdown(expires_at: OffsetDateTime, now: OffsetDateTime) -> String {
    if is_expired(expires_at, now) {
        format!("vencida ({})", timestamp(expires_at))
    } else {
        format!(
            "{} restantes",
            format_time_remaining(time_remaining(expires_at, now))
        )
    }
}

/// Merchant view of one invoice, with payment and history.
pub fn invoice_detail(invoice: &InvoiceWithPayment, now: OffsetDateTime) -> String {
    let inv = &invoice.invoice;
    let config = crypto_config(inv.method);
    let mut lines = vec![
        format!("Factura {}  {} {}", inv.id, config.icon, config.name),
        field("Estado", status_display(inv.status).label),
        field(
            "Monto",
            format!(
                "{} ({})",
                format_pen_amount(inv.amount_pen),
                format_crypto_amount(&inv.amount_crypto, inv.method)
            ),
        ),
    ];
    if let Some(description) = &inv.description {
        lines.push(field("Descripción", description));
    }
    lines.push(field("Destino", &inv.address_or_pr));
    lines.push(field("Enlace", &inv.payment_url));
    lines.push(field("Creada", timestamp(inv.created_at)));
    if inv.status.is_terminal() {
        lines.push(field("Expira", timestamp(inv.expires_at)));
    } else {
        lines.push(field("Expira", countdown(inv.expires_at, now)));
    }

    if let Some(payment) = &invoice.payment {
        lines.push(String::new());
        lines.push("Pago".to_owned());
        lines.push(field(
            "Recibido",
            format_crypto_amount(&payment.amount_received, inv.method),
        ));
        lines.push(field("Tx", &payment.tx_hash));
        lines.push(field(
            "Confirmac.",
            format!(
                "{}/{}",
                payment.confirmations,
                required_confirmations(inv.method)
            ),
        ));
        lines.push(field("Detectado", timestamp(payment.detected_at)));
        if let Some(confirmed_at) = payment.confirmed_at {
            lines.push(field("Confirmado", timestamp(confirmed_at)));
        }
    }

    if !invoice.state_timeline.is_empty() {
        lines.push(String::new());
        lines.push("Historial".to_owned());
        for entry in &invoice.state_timeline {
            lines.push(format!(
                "  {}  {}",
                timestamp(entry.at),
                status_display(entry.status).label
            ));
        }
    }
    lines.join("\n")
}

/// What the payer sees while paying.
pub fn payment_page(invoice: &InvoiceWithPayment, now: OffsetDateTime) -> String {
    let inv = &invoice.invoice;
    let config = crypto_config(inv.method);
    let mut lines = vec![
        format!("Pagar {}", format_pen_amount(inv.amount_pen)),
        field(
            "Enviar",
            format_crypto_amount(&inv.amount_crypto, inv.method),
        ),
        field("Red", format!("{} {}", config.icon, config.name)),
        field("A", &inv.address_or_pr),
        field("QR", &inv.qr_data),
        field("Estado", status_display(inv.status).label),
    ];
    if !inv.status.is_terminal() {
        lines.push(field("Tiempo", countdown(inv.expires_at, now)));
    }
    lines.join("\n")
}

fn invoice_row(invoice: &InvoiceWithPayment) -> String {
    let inv = &invoice.invoice;
    format!(
        "{:<38} {:<18} {:>12}  {:<10} {}",
        inv.id,
        status_display(inv.status).label,
        format_pen_amount(inv.amount_pen),
        inv.method,
        timestamp(inv.created_at)
    )
}

pub fn invoice_table(invoices: &[InvoiceWithPayment]) -> String {
    if invoices.is_empty() {
        return "No hay facturas".to_owned();
    }
    let mut lines = vec![format!(
        "{:<38} {:<18} {:>12}  {:<10} {}",
        "ID", "ESTADO", "MONTO", "MÉTODO", "CREADA"
    )];
    lines.extend(invoices.iter().map(invoice_row));
    lines.join("\n")
}

pub fn created(response: &CreateInvoiceResponse, now: OffsetDateTime) -> String {
    [
        format!("Factura creada: {}", response.invoice_id),
        field(
            "Monto",
            format!(
                "{} ({})",
                format_pen_amount(response.amount_pen),
                format_crypto_amount(&response.amount_crypto, response.method)
            ),
        ),
        field("Destino", &response.address_or_pr),
        field("Enlace", &response.payment_url),
        field("Expira", countdown(response.expires_at, now)),
    ]
    .join("\n")
}

/// One line per poller update.
pub fn poll_update(state: &PollState, now: OffsetDateTime) -> String {
    match (state.query_status(), &state.data) {
        (QueryStatus::Loading, _) => "Cargando…".to_owned(),
        (QueryStatus::Error, data) => {
            let error = state.error.as_deref().unwrap_or_default();
            match data {
                Some(invoice) => format!(
                    "{} (último estado: {})",
                    error,
                    status_display(invoice.status()).label
                ),
                None => error.to_owned(),
            }
        }
        (QueryStatus::Success, Some(invoice)) => {
            let label = status_display(invoice.status()).label;
            if state.is_polling {
                format!(
                    "{label} · {}",
                    countdown(invoice.invoice.expires_at, now)
                )
            } else {
                label.to_owned()
            }
        }
        (QueryStatus::Success, None) => String::new(),
    }
}

pub fn summary(summary: &InvoiceSummary, recent: &[InvoiceWithPayment]) -> String {
    let mut lines = vec![
        field("Facturas", summary.total),
        field("Cobrado", format_pen_amount(summary.confirmed_pen)),
        field("Por cobrar", format_pen_amount(summary.open_pen)),
        String::new(),
    ];
    lines.extend(
        summary
            .counts()
            .map(|(status, count)| field(status_display(status).label, count)),
    );
    if !recent.is_empty() {
        lines.push(String::new());
        lines.push("Recientes".to_owned());
        lines.push(invoice_table(recent));
    }
    lines.join("\n")
}

fn or_unset(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(sin configurar)")
}

pub fn settings(settings: &UserSettings) -> String {
    [
        field("BTC", or_unset(&settings.btc_address)),
        field("BTC xpub", or_unset(&settings.btc_xpub)),
        field("Lightning", or_unset(&settings.ln_endpoint)),
        field("EVM", or_unset(&settings.evm_address)),
        field("Webhook", or_unset(&settings.webhook_url)),
        field(
            "Secreto",
            if settings.webhook_secret.is_some() {
                "********"
            } else {
                "(sin configurar)"
            },
        ),
        field("Expiración", expiration_label(settings.default_expiry_min)),
        field("Confirmac.", settings.conf_target),
        field("Tolerancia", format!("{}%", settings.tolerance_pct)),
    ]
    .join("\n")
}

pub fn rates(rates: &ExchangeRates) -> String {
    rates
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => field(key, s),
            other => field(key, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A signed sample webhook, ready to paste into a receiver.
pub fn signed_webhook(header: &str, signature: &str, payload: &WebhookPayload) -> String {
    let body = serde_json::to_string_pretty(payload).unwrap_or_default();
    format!("{header}: {signature}\n\n{body}")
}

pub fn transactions(txs: &[Transaction]) -> String {
    if txs.is_empty() {
        return "Sin transacciones".to_owned();
    }
    txs.iter()
        .map(|tx| {
            let sign = match tx.tx_type {
                TxType::Expense => "-",
                TxType::Income => "+",
            };
            let date = tx.date.get(..10).unwrap_or(tx.date.as_str());
            format!(
                "{date}  {sign}{:>12}  {:<11} {:<36} {}",
                format_pen_amount(tx.amount),
                tx.category,
                tx.id,
                tx.note.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn month_overview(month: &str, totals: &MonthlyTotals, budget: Option<Budget>) -> String {
    let mut lines = vec![
        format!("Mes {month}"),
        field("Ingresos", format_pen_amount(totals.income)),
        field("Gastos", format_pen_amount(totals.expenses)),
        field("Balance", format_pen_amount(totals.balance())),
    ];
    if let Some(budget) = budget {
        lines.push(field("Ingreso mes.", format_pen_amount(budget.monthly_income)));
    }
    lines.join("\n")
}

pub fn alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "Sin alertas 🎉".to_owned();
    }
    alerts
        .iter()
        .map(|a| format!("⚠ {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use payo_core::backend::sample_invoices;
    use payo_core::finance::Category;
    use payo_sdk::objects::InvoiceStatus;
    use rust_decimal::Decimal;

    fn samples(now: OffsetDateTime) -> Vec<InvoiceWithPayment> {
        sample_invoices(now)
    }

    #[test]
    fn detail_shows_payment_and_history() {
        let now = OffsetDateTime::now_utc();
        let text = invoice_detail(&samples(now)[0], now);
        assert!(text.contains("Factura inv_1"));
        assert!(text.contains("S/. 150.00 (0.00234000 ₿)"));
        assert!(text.contains("Confirmado"));
        assert!(text.contains("Confirmac.:   0/0"));
        assert!(text.contains("Historial"));
        assert_eq!(text.matches("  Pendiente").count(), 1);
    }

    #[test]
    fn open_invoice_shows_countdown() {
        let now = OffsetDateTime::now_utc();
        let invoice = &samples(now)[1];
        let text = payment_page(invoice, now);
        assert!(text.contains("25.500000 ◊"));
        assert!(text.contains("15:00 restantes"));

        let later = now + time::Duration::hours(1);
        assert!(payment_page(invoice, later).contains("vencida"));
    }

    #[test]
    fn poll_updates_follow_query_status() {
        let now = OffsetDateTime::now_utc();
        let mut state = PollState {
            is_polling: true,
            ..Default::default()
        };
        assert_eq!(poll_update(&state, now), "Cargando…");

        state.data = Some(samples(now)[1].clone());
        assert!(poll_update(&state, now).starts_with("Pendiente · "));

        state.error = Some("api error: 502 Bad Gateway: ".into());
        assert!(poll_update(&state, now).contains("último estado: Pendiente"));

        state.error = None;
        state.is_polling = false;
        if let Some(data) = state.data.as_mut() {
            data.invoice.status = InvoiceStatus::Expired;
        }
        assert_eq!(poll_update(&state, now), "Expirado");
    }

    #[test]
    fn empty_lists_have_placeholders() {
        assert_eq!(invoice_table(&[]), "No hay facturas");
        assert_eq!(transactions(&[]), "Sin transacciones");
        assert_eq!(alerts(&[]), "Sin alertas 🎉");
    }

    #[test]
    fn transactions_show_sign_and_day() {
        let tx = Transaction {
            id: "t1".into(),
            amount: Decimal::new(45, 0),
            tx_type: TxType::Expense,
            category: Category::Transport,
            note: Some("taxi".into()),
            date: "2024-03-05T12:00:00Z".into(),
        };
        let text = transactions(&[tx]);
        assert!(text.starts_with("2024-03-05  -"));
        assert!(text.contains("S/. 45.00"));
        assert!(text.ends_with("taxi"));
    }

    #[test]
    fn settings_hide_the_secret() {
        let text = settings(&UserSettings {
            webhook_secret: Some("whsec_live".into()),
            ..Default::default()
        });
        assert!(!text.contains("whsec_live"));
        assert!(text.contains("15 minutos"));
    }
}
