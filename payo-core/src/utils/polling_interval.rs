use payo_sdk::objects::InvoiceStatus;
use std::time::Duration;

/// Interval used by the payment page while the payer is waiting.
pub const PAYMENT_PAGE_INTERVAL: Duration = Duration::from_millis(3000);

/// Interval used by the merchant's invoice detail view.
pub const INVOICE_DETAIL_INTERVAL: Duration = Duration::from_millis(5000);

/// Screen a poller is feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollProfile {
    #[default]
    PaymentPage,
    InvoiceDetail,
}

impl PollProfile {
    pub fn interval(self) -> Duration {
        match self {
            PollProfile::PaymentPage => PAYMENT_PAGE_INTERVAL,
            PollProfile::InvoiceDetail => INVOICE_DETAIL_INTERVAL,
        }
    }
}

/// Returns the delay before the next fetch, or `None` once the status is
/// terminal and polling should stop.
pub fn refetch_interval(status: InvoiceStatus, base: Duration) -> Option<Duration> {
    if status.is_terminal() {
        None
    } else {
        Some(base)
    }
}
