//! Event type definitions for invoice observation.
//!
//! Events are ephemeral notifications emitted by pollers. They describe
//! what the client saw; the backend remains the source of truth.

use payo_sdk::objects::InvoiceStatus;

/// How a poller ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A terminal status was observed.
    Settled(InvoiceStatus),
    /// Stopped by the caller before the invoice settled.
    Stopped,
}

/// Events emitted while an invoice is being polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceEvent {
    /// A fetch returned a status different from the last one seen.
    /// `previous` is `None` for the first successful fetch.
    StatusObserved {
        invoice_id: String,
        previous: Option<InvoiceStatus>,
        status: InvoiceStatus,
    },
    /// A fetch failed; polling continues on the next tick.
    FetchFailed { invoice_id: String, error: String },
    /// The poller will not fetch again.
    PollingFinished {
        invoice_id: String,
        outcome: PollOutcome,
    },
}

impl InvoiceEvent {
    pub fn invoice_id(&self) -> &str {
        match self {
            InvoiceEvent::StatusObserved { invoice_id, .. }
            | InvoiceEvent::FetchFailed { invoice_id, .. }
            | InvoiceEvent::PollingFinished { invoice_id, .. } => invoice_id,
        }
    }
}
