//! Events reported by invoice pollers.
//!
//! A poller publishes its full state on a `watch` channel for views that
//! only care about the latest snapshot, and discrete [`InvoiceEvent`]s on
//! an optional `mpsc` channel for consumers that react to each change.

pub mod channels;
pub mod types;

pub use channels::{
    invoice_event_channel, InvoiceEventReceiver, InvoiceEventSender, DEFAULT_CHANNEL_BUFFER,
};

pub use types::{InvoiceEvent, PollOutcome};
