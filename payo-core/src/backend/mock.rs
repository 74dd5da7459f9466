//! In-memory stand-in for the invoicing backend.
//!
//! Implements the same [`InvoiceApi`] as the live client so views can run
//! without a server. Invoices live in a `RwLock`-guarded list; status
//! changes happen only through [`MockInvoiceApi::advance`] and
//! [`MockInvoiceApi::expire_overdue`], which play the role of the backend's
//! blockchain listeners and expiry sweep.

use async_trait::async_trait;
use payo_sdk::client::{ClientError, InvoiceApi, StatusCode};
use payo_sdk::objects::{
    CreateInvoiceRequest, CreateInvoiceResponse, ExchangeRates, HealthStatus, Invoice,
    InvoiceFilters, InvoiceStatus, InvoiceWithPayment, Method, Payment, TimelineEntry,
};
use payo_sdk::rules::{
    coerce_amount, convert_pen, crypto_config, mock_rate, required_confirmations,
};
use rust_decimal::Decimal;
use smallvec::smallvec;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

const PAYMENT_URL_BASE: &str = "https://payo.app/pay";

/// Errors from driving the mock backend's lifecycle.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("invoice not found: {0}")]
    NotFound(String),

    #[error("invoice {invoice_id} cannot move from {from} to {to}")]
    IllegalTransition {
        invoice_id: String,
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
}

/// Settings for [`MockInvoiceApi`].
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Artificial delay applied to every call.
    pub latency: Duration,
    /// Lifetime of newly created invoices, in minutes.
    pub default_expiry_min: u32,
    /// Start with the two sample invoices.
    pub seed_samples: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1000),
            default_expiry_min: 15,
            seed_samples: true,
        }
    }
}

#[derive(Debug)]
pub struct MockInvoiceApi {
    invoices: RwLock<Vec<InvoiceWithPayment>>,
    latency: Duration,
    default_expiry: time::Duration,
}

impl MockInvoiceApi {
    pub fn new(config: MockConfig) -> Self {
        let invoices = if config.seed_samples {
            sample_invoices(OffsetDateTime::now_utc())
        } else {
            Vec::new()
        };
        Self {
            invoices: RwLock::new(invoices),
            latency: config.latency,
            default_expiry: time::Duration::minutes(i64::from(config.default_expiry_min)),
        }
    }

    /// An empty mock with no latency.
    pub fn empty() -> Self {
        Self::new(MockConfig {
            latency: Duration::ZERO,
            seed_samples: false,
            ..Default::default()
        })
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Move an invoice to `next`, appending to its timeline and recording a
    /// payment when funds are seen.
    ///
    /// Only direct transitions are accepted, so the resulting timeline is
    /// always valid.
    pub async fn advance(
        &self,
        invoice_id: &str,
        next: InvoiceStatus,
    ) -> Result<InvoiceWithPayment, MockError> {
        let now = OffsetDateTime::now_utc();
        let mut invoices = self.invoices.write().await;
        let entry = invoices
            .iter_mut()
            .find(|i| i.id() == invoice_id)
            .ok_or_else(|| MockError::NotFound(invoice_id.to_owned()))?;

        let current = entry.status();
        if !current.can_transition_to(next) {
            return Err(MockError::IllegalTransition {
                invoice_id: invoice_id.to_owned(),
                from: current,
                to: next,
            });
        }

        apply_transition(entry, next, now);
        info!(invoice_id, from = %current, to = %next, "Mock invoice advanced");
        Ok(entry.clone())
    }

    /// Expire every pending invoice whose deadline has passed, returning
    /// their ids.
    pub async fn expire_overdue(&self, now: OffsetDateTime) -> Vec<String> {
        let mut invoices = self.invoices.write().await;
        let mut expired = Vec::new();
        for invoice in invoices.iter_mut().filter(|i| {
            i.status() == InvoiceStatus::Pending && i.invoice.expires_at < now
        }) {
            apply_transition(invoice, InvoiceStatus::Expired, now);
            expired.push(invoice.invoice.id.clone());
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Mock invoices expired");
        }
        expired
    }
}

impl Default for MockInvoiceApi {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

fn apply_transition(entry: &mut InvoiceWithPayment, next: InvoiceStatus, now: OffsetDateTime) {
    let invoice = &entry.invoice;
    match next {
        InvoiceStatus::Detected | InvoiceStatus::Underpaid if entry.payment.is_none() => {
            let received = if next == InvoiceStatus::Underpaid {
                // Half of what was asked.
                (coerce_amount(&invoice.amount_crypto) / Decimal::TWO)
                    .round_dp(crypto_config(invoice.method).decimals)
            } else {
                coerce_amount(&invoice.amount_crypto)
            };
            entry.payment = Some(Payment {
                id: format!("pay_{}", Uuid::now_v7().simple()),
                invoice_id: invoice.id.clone(),
                tx_hash: hex::encode(rand::random::<[u8; 32]>()),
                amount_received: received.to_string(),
                confirmations: 0,
                detected_at: now,
                confirmed_at: None,
            });
        }
        InvoiceStatus::Confirmed => {
            let required = required_confirmations(invoice.method);
            if let Some(payment) = entry.payment.as_mut() {
                payment.confirmations = payment.confirmations.max(required);
                payment.confirmed_at = Some(now);
            }
        }
        _ => {}
    }
    entry.invoice.status = next;
    entry.invoice.updated_at = now;
    entry.state_timeline.push(TimelineEntry {
        status: next,
        at: now,
    });
}

fn not_found() -> ClientError {
    ClientError::Api {
        status: StatusCode::NOT_FOUND,
        body: r#"{"detail":"Invoice not found"}"#.to_owned(),
    }
}

fn bad_request(detail: &str) -> ClientError {
    ClientError::Api {
        status: StatusCode::BAD_REQUEST,
        body: serde_json::json!({ "detail": detail }).to_string(),
    }
}

/// Destination for a new invoice: a Lightning payment request, a Bitcoin
/// address or an EVM address. `None` when the amount does not fit in sats.
fn destination(method: Method, amount_crypto: Decimal) -> Option<String> {
    let destination = match method {
        Method::BtcLn => {
            let sats = amount_crypto
                .checked_mul(Decimal::from(100_000_000u64))?
                .trunc()
                .normalize();
            format!("lnbc{sats}1p{}", hex::encode(rand::random::<[u8; 20]>()))
        }
        Method::Btc => format!("bc1q{}", hex::encode(rand::random::<[u8; 19]>())),
        Method::UsdcBase => format!("0x{}", hex::encode(rand::random::<[u8; 20]>())),
    };
    Some(destination)
}

#[async_trait]
impl InvoiceApi for MockInvoiceApi {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(HealthStatus::healthy())
    }

    async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<CreateInvoiceResponse, ClientError> {
        self.simulate_latency().await;
        if request.amount_pen <= Decimal::ZERO {
            return Err(bad_request("amount_pen must be positive"));
        }

        let now = OffsetDateTime::now_utc();
        let id = format!("inv_{}", Uuid::now_v7().simple());
        let method = request.method;
        let crypto = convert_pen(request.amount_pen, method);
        let amount_crypto = format!("{:.*}", crypto_config(method).decimals as usize, crypto);
        let address_or_pr =
            destination(method, crypto).ok_or_else(|| bad_request("amount_pen too large"))?;

        let invoice = Invoice {
            id: id.clone(),
            amount_pen: request.amount_pen,
            amount_crypto,
            asset: method.asset().to_owned(),
            chain: method.chain().to_owned(),
            method,
            description: request.description.clone(),
            address_or_pr,
            status: InvoiceStatus::Pending,
            expires_at: now + self.default_expiry,
            created_at: now,
            updated_at: now,
            payment_url: format!("{PAYMENT_URL_BASE}/{id}"),
            qr_data: format!("payo:{id}"),
        };
        let response = CreateInvoiceResponse {
            invoice_id: id.clone(),
            method,
            amount_pen: invoice.amount_pen,
            amount_crypto: invoice.amount_crypto.clone(),
            asset: invoice.asset.clone(),
            chain: invoice.chain.clone(),
            address_or_pr: invoice.address_or_pr.clone(),
            expires_at: invoice.expires_at,
            payment_url: invoice.payment_url.clone(),
            qr_data: invoice.qr_data.clone(),
        };

        self.invoices.write().await.push(InvoiceWithPayment {
            invoice,
            payment: None,
            state_timeline: smallvec![TimelineEntry {
                status: InvoiceStatus::Pending,
                at: now,
            }],
        });
        debug!(invoice_id = %id, %method, "Mock invoice created");

        Ok(response)
    }

    async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceWithPayment, ClientError> {
        self.simulate_latency().await;
        self.invoices
            .read()
            .await
            .iter()
            .find(|i| i.id() == invoice_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list_invoices(
        &self,
        filters: &InvoiceFilters,
    ) -> Result<Vec<InvoiceWithPayment>, ClientError> {
        self.simulate_latency().await;
        let invoices = self.invoices.read().await;
        let mut matching: Vec<InvoiceWithPayment> = invoices
            .iter()
            .filter(|i| {
                filters.matches(i.status(), i.invoice.method, i.invoice.created_at)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.invoice.created_at.cmp(&a.invoice.created_at));

        let offset = filters.offset.unwrap_or(0) as usize;
        let limit = filters.limit.map_or(usize::MAX, |l| l as usize);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn exchange_rates(&self) -> Result<ExchangeRates, ClientError> {
        self.simulate_latency().await;
        let mut rates = ExchangeRates::new();
        rates.insert("base".to_owned(), "PEN".into());
        rates.insert(
            "BTC".to_owned(),
            mock_rate(Method::Btc).round_dp(10).to_string().into(),
        );
        rates.insert(
            "USDC".to_owned(),
            mock_rate(Method::UsdcBase).round_dp(10).to_string().into(),
        );
        Ok(rates)
    }
}

/// The two invoices the mock starts with: one settled Lightning invoice
/// and one open USDC invoice.
pub fn sample_invoices(now: OffsetDateTime) -> Vec<InvoiceWithPayment> {
    let minutes = time::Duration::minutes;
    let settled = InvoiceWithPayment {
        invoice: Invoice {
            id: "inv_1".to_owned(),
            amount_pen: Decimal::new(150, 0),
            amount_crypto: "0.00234".to_owned(),
            asset: "BTC".to_owned(),
            chain: "bitcoin".to_owned(),
            method: Method::BtcLn,
            description: Some("Consultoría web".to_owned()),
            address_or_pr: "lnbc1234567890".to_owned(),
            status: InvoiceStatus::Confirmed,
            expires_at: now - minutes(10),
            created_at: now - minutes(20),
            updated_at: now - minutes(5),
            payment_url: format!("{PAYMENT_URL_BASE}/inv_1"),
            qr_data: "payo:inv_1".to_owned(),
        },
        payment: Some(Payment {
            id: "pay_1".to_owned(),
            invoice_id: "inv_1".to_owned(),
            tx_hash: "abc123".to_owned(),
            amount_received: "0.00234".to_owned(),
            confirmations: 0,
            detected_at: now - minutes(10),
            confirmed_at: Some(now - minutes(5)),
        }),
        state_timeline: smallvec![
            TimelineEntry {
                status: InvoiceStatus::Pending,
                at: now - minutes(20),
            },
            TimelineEntry {
                status: InvoiceStatus::Detected,
                at: now - minutes(10),
            },
            TimelineEntry {
                status: InvoiceStatus::Confirmed,
                at: now - minutes(5),
            },
        ],
    };
    let open = InvoiceWithPayment {
        invoice: Invoice {
            id: "inv_2".to_owned(),
            amount_pen: Decimal::new(75, 0),
            amount_crypto: "25.5".to_owned(),
            asset: "USDC".to_owned(),
            chain: "base".to_owned(),
            method: Method::UsdcBase,
            description: Some("Diseño logo".to_owned()),
            address_or_pr: "0x742d35Cc6635C0532925a3b8D2F3ED3e9".to_owned(),
            status: InvoiceStatus::Pending,
            expires_at: now + minutes(15),
            created_at: now - minutes(2),
            updated_at: now,
            payment_url: format!("{PAYMENT_URL_BASE}/inv_2"),
            qr_data: "payo:inv_2".to_owned(),
        },
        payment: None,
        state_timeline: smallvec![TimelineEntry {
            status: InvoiceStatus::Pending,
            at: now - minutes(2),
        }],
    };
    vec![settled, open]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MockInvoiceApi {
        MockInvoiceApi::new(MockConfig {
            latency: Duration::ZERO,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn samples_have_valid_timelines() {
        let api = seeded();
        let invoices = api.list_invoices(&InvoiceFilters::default()).await.unwrap();
        assert_eq!(invoices.len(), 2);
        for invoice in &invoices {
            invoice.validate_timeline().unwrap();
        }
        // Newest first.
        assert_eq!(invoices[0].id(), "inv_2");
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let api = MockInvoiceApi::empty();
        let created = api
            .create_invoice(&CreateInvoiceRequest {
                amount_pen: Decimal::new(150, 0),
                method: Method::BtcLn,
                description: Some("Consultoría".into()),
            })
            .await
            .unwrap();

        assert_eq!(created.amount_crypto, "0.00234000");
        assert!(created.address_or_pr.starts_with("lnbc234000"));
        assert_eq!(created.qr_data, format!("payo:{}", created.invoice_id));
        assert!(created.expires_at - OffsetDateTime::now_utc() <= time::Duration::minutes(15));

        let fetched = api.get_invoice(&created.invoice_id).await.unwrap();
        assert_eq!(fetched.status(), InvoiceStatus::Pending);
        assert_eq!(fetched.state_timeline.len(), 1);
        assert_eq!(fetched.invoice.asset, "BTC");
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let api = MockInvoiceApi::empty();
        let err = api
            .create_invoice(&CreateInvoiceRequest {
                amount_pen: Decimal::ZERO,
                method: Method::Btc,
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn oversized_lightning_amount_is_rejected() {
        let api = MockInvoiceApi::empty();
        let err = api
            .create_invoice(&CreateInvoiceRequest {
                amount_pen: Decimal::from_i128_with_scale(10i128.pow(26), 0),
                method: Method::BtcLn,
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(err.to_string().contains("amount_pen too large"), "{err}");
        assert!(
            api.list_invoices(&InvoiceFilters::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let err = seeded().get_invoice("inv_404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn advance_follows_the_lifecycle() {
        let api = seeded();
        let detected = api.advance("inv_2", InvoiceStatus::Detected).await.unwrap();
        assert!(detected.payment.is_some());

        let confirmed = api.advance("inv_2", InvoiceStatus::Confirmed).await.unwrap();
        let payment = confirmed.payment.as_ref().unwrap();
        assert_eq!(payment.confirmations, 3);
        assert!(payment.confirmed_at.is_some());
        confirmed.validate_timeline().unwrap();

        let err = api.advance("inv_2", InvoiceStatus::Pending).await.unwrap_err();
        assert!(matches!(err, MockError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn underpaid_records_partial_amount() {
        let api = seeded();
        let underpaid = api.advance("inv_2", InvoiceStatus::Underpaid).await.unwrap();
        assert_eq!(underpaid.payment.unwrap().amount_received, "12.75");
    }

    #[tokio::test]
    async fn filters_and_paging() {
        let api = seeded();
        let pending = api
            .list_invoices(&InvoiceFilters {
                status: Some(InvoiceStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), "inv_2");

        let second_page = api
            .list_invoices(&InvoiceFilters {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id(), "inv_1");
    }

    #[tokio::test]
    async fn overdue_pending_invoices_expire() {
        let api = seeded();
        let later = OffsetDateTime::now_utc() + time::Duration::hours(1);
        assert_eq!(api.expire_overdue(later).await, vec!["inv_2".to_owned()]);

        let expired = api.get_invoice("inv_2").await.unwrap();
        assert_eq!(expired.status(), InvoiceStatus::Expired);
        expired.validate_timeline().unwrap();
        assert!(api.expire_overdue(later).await.is_empty());
    }
}
