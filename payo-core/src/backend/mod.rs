//! Backend selection.
//!
//! Views depend only on [`InvoiceApi`]; which implementation sits behind it
//! is decided once at startup from configuration.

pub mod mock;

pub use mock::{sample_invoices, MockConfig, MockError, MockInvoiceApi};

use payo_sdk::client::{ClientError, HttpInvoiceApi, InvoiceApi};
use payo_sdk::config::ApiConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which [`InvoiceApi`] implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiBackend {
    /// In-memory backend seeded with sample invoices.
    #[default]
    Mock,
    /// HTTP client against a running server.
    Live,
}

impl std::fmt::Display for ApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiBackend::Mock => write!(f, "mock"),
            ApiBackend::Live => write!(f, "live"),
        }
    }
}

impl std::str::FromStr for ApiBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(ApiBackend::Mock),
            "live" => Ok(ApiBackend::Live),
            other => Err(format!("unknown backend: {other} (expected mock or live)")),
        }
    }
}

/// A ready backend. `mock` is set when the mock is in use so callers can
/// drive its lifecycle hooks.
#[derive(Clone)]
pub struct Backend {
    pub api: Arc<dyn InvoiceApi>,
    pub mock: Option<Arc<MockInvoiceApi>>,
}

/// Build the configured backend.
pub fn build_api(
    backend: ApiBackend,
    api: &ApiConfig,
    mock: MockConfig,
) -> Result<Backend, ClientError> {
    match backend {
        ApiBackend::Mock => {
            info!(latency_ms = mock.latency.as_millis() as u64, "Using mock backend");
            let mock = Arc::new(MockInvoiceApi::new(mock));
            Ok(Backend {
                api: mock.clone(),
                mock: Some(mock),
            })
        }
        ApiBackend::Live => {
            info!(base_url = %api.base_url, "Using live backend");
            Ok(Backend {
                api: Arc::new(HttpInvoiceApi::from_config(api)?),
                mock: None,
            })
        }
    }
}
