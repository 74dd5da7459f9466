use crate::objects::method::Method;
use crate::objects::status::InvoiceStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use time::OffsetDateTime;

/// An invoice as returned by the invoicing API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Requested amount in Peruvian soles.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_pen: Decimal,
    /// Crypto amount as computed by the backend, kept as the raw decimal
    /// string it was sent as.
    pub amount_crypto: String,
    pub asset: String,
    pub chain: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// On-chain address or Lightning payment request.
    pub address_or_pr: String,
    pub status: InvoiceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub payment_url: String,
    pub qr_data: String,
}

/// A payment detected for an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub tx_hash: String,
    pub amount_received: String,
    pub confirmations: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub detected_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmed_at: Option<OffsetDateTime>,
}

/// One step of an invoice's status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: InvoiceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Invoice detail: the invoice, its payment if any, and its status history.
///
/// The list endpoint of the backend omits `payment` and `state_timeline`,
/// so both default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceWithPayment {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub state_timeline: SmallVec<[TimelineEntry; 4]>,
}

/// Violations found by [`InvoiceWithPayment::validate_timeline`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("timeline entry {index} at {at} is earlier than the entry before it")]
    OutOfOrder { index: usize, at: OffsetDateTime },
    #[error("timeline moves from {from} to {to}, which is not an allowed transition")]
    IllegalTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
    #[error("timeline ends at {timeline} but the invoice reports {current}")]
    StatusMismatch {
        timeline: InvoiceStatus,
        current: InvoiceStatus,
    },
}

impl InvoiceWithPayment {
    pub fn id(&self) -> &str {
        &self.invoice.id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.invoice.status
    }

    /// Check that the timeline is ordered, only uses allowed transitions and
    /// agrees with the current status.
    pub fn validate_timeline(&self) -> Result<(), TimelineError> {
        for (index, pair) in self.state_timeline.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if next.at < prev.at {
                return Err(TimelineError::OutOfOrder {
                    index: index + 1,
                    at: next.at,
                });
            }
            if !prev.status.can_transition_to(next.status) {
                return Err(TimelineError::IllegalTransition {
                    from: prev.status,
                    to: next.status,
                });
            }
        }
        match self.state_timeline.last() {
            Some(last) if last.status != self.invoice.status => {
                Err(TimelineError::StatusMismatch {
                    timeline: last.status,
                    current: self.invoice.status,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Request payload for creating a new invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_pen: Decimal,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response returned by the "create invoice" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceResponse {
    pub invoice_id: String,
    pub method: Method,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_pen: Decimal,
    pub amount_crypto: String,
    pub asset: String,
    pub chain: String,
    pub address_or_pr: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub payment_url: String,
    pub qr_data: String,
}
