//! TOML file configuration structures.
//!
//! These structs directly map to the `payo.toml` file format. Every section
//! is optional; a missing file behaves like an empty one.

use payo_core::backend::ApiBackend;
use payo_sdk::config::ApiConfig;
use payo_sdk::objects::UserSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub mock: MockSection,
    #[serde(default)]
    pub finance: FinanceSection,
    /// Merchant preferences edited by `payo settings set`.
    #[serde(default)]
    pub settings: UserSettings,
}

/// Backend selection and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub backend: ApiBackend,
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Request timeout for the live client. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// How long fetched invoices are reused before refetching.
    #[serde(default)]
    pub stale_time_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            backend: ApiBackend::default(),
            base_url: default_base_url(),
            timeout_secs: None,
            stale_time_secs: 0,
        }
    }
}

fn default_base_url() -> Url {
    ApiConfig::default().base_url
}

/// Refetch intervals for `payo invoice watch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_payment_page_ms")]
    pub payment_page_ms: u64,
    #[serde(default = "default_invoice_detail_ms")]
    pub invoice_detail_ms: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            payment_page_ms: default_payment_page_ms(),
            invoice_detail_ms: default_invoice_detail_ms(),
        }
    }
}

fn default_payment_page_ms() -> u64 {
    3000
}

fn default_invoice_detail_ms() -> u64 {
    5000
}

/// In-memory backend behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockSection {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default = "default_true")]
    pub seed_samples: bool,
}

impl Default for MockSection {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            seed_samples: true,
        }
    }
}

fn default_latency_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

/// Finance tracker storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSection {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for FinanceSection {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("payo-finance.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[api]
backend = "live"
base_url = "https://api.payo.app"
timeout_secs = 10
stale_time_secs = 30

[polling]
payment_page_ms = 2000

[mock]
latency_ms = 0
seed_samples = false

[finance]
store_path = "/tmp/finance.json"

[settings]
btc_address = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh"
webhook_url = "https://shop.example/hooks/payo"
webhook_secret = "whsec_123"
default_expiry_min = 60
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.backend, ApiBackend::Live);
        assert_eq!(config.api.base_url.as_str(), "https://api.payo.app/");
        assert_eq!(config.api.timeout_secs, Some(10));
        assert_eq!(config.polling.payment_page_ms, 2000);
        assert_eq!(config.polling.invoice_detail_ms, 5000);
        assert!(!config.mock.seed_samples);
        assert_eq!(config.finance.store_path, PathBuf::from("/tmp/finance.json"));
        assert_eq!(config.settings.default_expiry_min, 60);
        assert_eq!(config.settings.tolerance_pct, 1);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.backend, ApiBackend::Mock);
        assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.mock.latency_ms, 1000);
        assert_eq!(config.settings, UserSettings::default());
    }
}
