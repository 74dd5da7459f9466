//! Merchant preferences: destination addresses, webhook target and the
//! defaults applied to new invoices.

use crate::rules::PaymentRules;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btc_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btc_xpub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ln_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_expiry_min")]
    pub default_expiry_min: u32,
    #[serde(default = "default_conf_target")]
    pub conf_target: u32,
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: u32,
}

fn default_expiry_min() -> u32 {
    PaymentRules::DEFAULT_EXPIRATION_MIN
}

fn default_conf_target() -> u32 {
    1
}

fn default_tolerance_pct() -> u32 {
    PaymentRules::DEFAULT_TOLERANCE_PCT
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            btc_address: None,
            btc_xpub: None,
            ln_endpoint: None,
            evm_address: None,
            webhook_url: None,
            webhook_secret: None,
            default_expiry_min: default_expiry_min(),
            conf_target: default_conf_target(),
            tolerance_pct: default_tolerance_pct(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid webhook url: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),
    #[error("expiry of {0} minutes is not one of the offered options")]
    UnsupportedExpiry(u32),
    #[error("{0} confirmations is not one of the offered options")]
    UnsupportedConfirmations(u32),
    #[error("tolerance of {0}% is not one of the offered options")]
    UnsupportedTolerance(u32),
    #[error("webhook secret is set but no webhook url is configured")]
    SecretWithoutWebhook,
}

impl UserSettings {
    /// Check the preferences against the option lists the settings screen
    /// offers.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !PaymentRules::EXPIRATION_OPTIONS.contains(&self.default_expiry_min) {
            return Err(SettingsError::UnsupportedExpiry(self.default_expiry_min));
        }
        if !PaymentRules::CONFIRMATION_OPTIONS.contains(&self.conf_target) {
            return Err(SettingsError::UnsupportedConfirmations(self.conf_target));
        }
        if !PaymentRules::TOLERANCE_OPTIONS.contains(&self.tolerance_pct) {
            return Err(SettingsError::UnsupportedTolerance(self.tolerance_pct));
        }
        match (&self.webhook_url, &self.webhook_secret) {
            (Some(webhook_url), _) => {
                url::Url::parse(webhook_url)?;
            }
            (None, Some(_)) => return Err(SettingsError::SecretWithoutWebhook),
            (None, None) => {}
        }
        Ok(())
    }

    /// Destination configured for a payment method, if any.
    pub fn destination_for(&self, method: crate::objects::Method) -> Option<&str> {
        use crate::objects::Method;
        match method {
            Method::BtcLn => self.ln_endpoint.as_deref(),
            Method::Btc => self.btc_address.as_deref().or(self.btc_xpub.as_deref()),
            Method::UsdcBase => self.evm_address.as_deref(),
        }
    }
}
