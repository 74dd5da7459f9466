pub mod filters;
pub mod invoice;
pub mod method;
pub mod rates;
pub mod settings;
pub mod status;
pub mod webhook;

pub use filters::InvoiceFilters;
pub use invoice::{
    CreateInvoiceRequest, CreateInvoiceResponse, Invoice, InvoiceWithPayment, Payment,
    TimelineEntry, TimelineError,
};
pub use method::Method;
pub use rates::{ExchangeRates, HealthStatus};
pub use settings::{SettingsError, UserSettings};
pub use status::InvoiceStatus;
pub use webhook::{WebhookEventType, WebhookPayload};
