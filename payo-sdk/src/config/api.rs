//! API location and endpoint paths.

use std::time::Duration;
use url::Url;

/// Base URL of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Fixed endpoint paths of the invoicing API.
pub struct Endpoints;

impl Endpoints {
    pub const HEALTH: &'static str = "/health";
    pub const EXCHANGE_RATES: &'static str = "/api/exchange-rates";
    pub const INVOICES: &'static str = "/api/invoices";
}

/// Where the live client sends its requests.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Root URL of the backend.
    pub base_url: Url,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        // The constant is a valid absolute URL.
        #[allow(clippy::expect_used)]
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("valid default base url");
        Self::new(base_url)
    }
}
