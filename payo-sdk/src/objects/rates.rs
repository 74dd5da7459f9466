use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exchange rates as returned by `GET /api/exchange-rates`.
///
/// The backend does not commit to a shape, so values are kept as raw JSON.
pub type ExchangeRates = BTreeMap<String, serde_json::Value>;

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_owned(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
