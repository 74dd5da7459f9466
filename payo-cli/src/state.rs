//! Application state shared by all commands.

use crate::config::RuntimeConfig;
use payo_core::backend::{build_api, MockInvoiceApi};
use payo_core::queries::InvoiceQueries;
use payo_core::utils::polling_interval::PollProfile;
use payo_sdk::client::ClientError;
use std::sync::Arc;
use std::time::Duration;

/// Cloneable, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    pub queries: Arc<InvoiceQueries>,
    /// Set when running against the in-memory backend.
    pub mock: Option<Arc<MockInvoiceApi>>,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Result<Self, ClientError> {
        let backend = build_api(config.backend, &config.api, config.mock.clone())?;
        let queries = InvoiceQueries::with_stale_time(backend.api, config.stale_time);
        Ok(Self {
            config: Arc::new(config),
            queries: Arc::new(queries),
            mock: backend.mock,
        })
    }

    /// Refetch interval for a watch profile, as configured.
    pub fn poll_interval(&self, profile: PollProfile) -> Duration {
        match profile {
            PollProfile::PaymentPage => self.config.payment_page_interval,
            PollProfile::InvoiceDetail => self.config.invoice_detail_interval,
        }
    }
}
