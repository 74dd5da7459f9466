//! Event channel factories and handles.

use super::types::InvoiceEvent;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for InvoiceEvent events.
pub type InvoiceEventSender = mpsc::Sender<InvoiceEvent>;
/// Receiver handle for InvoiceEvent events.
pub type InvoiceEventReceiver = mpsc::Receiver<InvoiceEvent>;

/// Create a new InvoiceEvent channel.
///
/// Several pollers may share clones of the returned sender.
pub fn invoice_event_channel() -> (InvoiceEventSender, InvoiceEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
