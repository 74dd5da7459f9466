//! Background processors.
//!
//! - `InvoicePoller`: re-fetches one invoice on an interval until it
//!   settles, publishing `PollState` and emitting `InvoiceEvent`s

pub mod invoice_poller;

pub use invoice_poller::{InvoicePoller, PollState, PollTick, PollerHandle, QueryStatus};
