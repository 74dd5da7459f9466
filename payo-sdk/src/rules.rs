//! Payment rules and display helpers.
//!
//! Everything here is pure: callers pass `now` explicitly where time
//! matters, so the helpers can be tested without a clock.

use crate::objects::{InvoiceStatus, Method};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// Option lists and defaults offered when creating invoices and editing
/// settings.
pub struct PaymentRules;

impl PaymentRules {
    /// 15 min, 30 min, 1 h, 24 h.
    pub const EXPIRATION_OPTIONS: [u32; 4] = [15, 30, 60, 1440];
    pub const DEFAULT_EXPIRATION_MIN: u32 = 15;

    /// Accepted under/over-payment, in percent.
    pub const TOLERANCE_OPTIONS: [u32; 4] = [0, 1, 2, 5];
    pub const DEFAULT_TOLERANCE_PCT: u32 = 1;

    pub const CONFIRMATION_OPTIONS: [u32; 4] = [0, 1, 3, 6];
}

/// Confirmations required before a payment is considered final.
pub fn required_confirmations(method: Method) -> u32 {
    match method {
        Method::BtcLn => 0,
        Method::Btc => 1,
        Method::UsdcBase => 3,
    }
}

/// Static presentation data for a payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoConfig {
    pub name: &'static str,
    pub symbol: &'static str,
    pub icon: &'static str,
    pub decimals: u32,
    pub chain: &'static str,
}

pub fn crypto_config(method: Method) -> CryptoConfig {
    match method {
        Method::BtcLn => CryptoConfig {
            name: "BTC Lightning",
            symbol: "₿",
            icon: "⚡",
            decimals: 8,
            chain: "bitcoin-lightning",
        },
        Method::Btc => CryptoConfig {
            name: "Bitcoin",
            symbol: "₿",
            icon: "₿",
            decimals: 8,
            chain: "bitcoin",
        },
        Method::UsdcBase => CryptoConfig {
            name: "USDC (Base)",
            symbol: "◊",
            icon: "◊",
            decimals: 6,
            chain: "base",
        },
    }
}

/// Badge color used for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusColor {
    Warning,
    Secondary,
    Success,
    Muted,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub color: StatusColor,
    pub icon: &'static str,
}

pub fn status_display(status: InvoiceStatus) -> StatusDisplay {
    match status {
        InvoiceStatus::Pending => StatusDisplay {
            label: "Pendiente",
            color: StatusColor::Warning,
            icon: "Clock",
        },
        InvoiceStatus::Detected => StatusDisplay {
            label: "Detectado",
            color: StatusColor::Secondary,
            icon: "AlertCircle",
        },
        InvoiceStatus::Confirmed => StatusDisplay {
            label: "Confirmado",
            color: StatusColor::Success,
            icon: "CheckCircle",
        },
        InvoiceStatus::Expired => StatusDisplay {
            label: "Expirado",
            color: StatusColor::Muted,
            icon: "XCircle",
        },
        InvoiceStatus::Underpaid => StatusDisplay {
            label: "Pago insuficiente",
            color: StatusColor::Danger,
            icon: "AlertTriangle",
        },
    }
}

/// Parse a user or wire supplied amount, coercing anything malformed to
/// zero.
pub fn coerce_amount(raw: &str) -> Decimal {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}

fn fixed(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

/// `S/. 150.00`
pub fn format_pen_amount(amount: Decimal) -> String {
    format!("S/. {}", fixed(amount, 2))
}

/// Crypto amount with the method's precision and symbol, e.g.
/// `0.00234000 ₿`.
pub fn format_crypto_amount(amount: &str, method: Method) -> String {
    let config = crypto_config(method);
    format!("{} {}", fixed(coerce_amount(amount), config.decimals), config.symbol)
}

/// Conversion rates used for previews and by the mock backend, in crypto
/// units per PEN.
pub fn mock_rate(method: Method) -> Decimal {
    match method {
        // 150 PEN buys 0.00234 BTC.
        Method::BtcLn | Method::Btc => Decimal::new(234, 5) / Decimal::new(150, 0),
        Method::UsdcBase => Decimal::ONE / Decimal::new(375, 2),
    }
}

/// Crypto amount for `amount_pen` at the mock rate, rounded to the
/// method's precision.
pub fn convert_pen(amount_pen: Decimal, method: Method) -> Decimal {
    (amount_pen * mock_rate(method)).round_dp_with_strategy(
        crypto_config(method).decimals,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Preview shown while an invoice is being filled in, e.g.
/// `≈ 0.00234000 BTC`. Returns `None` for non-positive amounts.
pub fn rate_preview(amount_pen: Decimal, method: Method) -> Option<String> {
    if amount_pen <= Decimal::ZERO {
        return None;
    }
    let amount = amount_pen * mock_rate(method);
    let decimals = match method {
        Method::BtcLn | Method::Btc => 8,
        Method::UsdcBase => 2,
    };
    Some(format!("≈ {} {}", fixed(amount, decimals), method.asset()))
}

pub fn is_expired(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    now > expires_at
}

/// `max(0, expires_at - now)`.
pub fn time_remaining(expires_at: OffsetDateTime, now: OffsetDateTime) -> Duration {
    Duration::try_from(expires_at - now).unwrap_or(Duration::ZERO)
}

/// `m:ss`, minutes unbounded.
pub fn format_time_remaining(remaining: Duration) -> String {
    let total_seconds = remaining.as_secs();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Human label for an expiration option, e.g. `15 minutos` or `24 horas`.
pub fn expiration_label(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes} minutos")
    } else {
        let hours = minutes / 60;
        format!("{hours} hora{}", if minutes > 60 { "s" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn status_mapping_is_total_and_distinct() {
        let labels: std::collections::HashSet<_> = InvoiceStatus::ALL
            .into_iter()
            .map(|s| status_display(s).label)
            .collect();
        assert_eq!(labels.len(), InvoiceStatus::ALL.len());
        assert_eq!(status_display(InvoiceStatus::Pending).color, StatusColor::Warning);
        assert_eq!(status_display(InvoiceStatus::Underpaid).color, StatusColor::Danger);
        assert_eq!(status_display(InvoiceStatus::Confirmed), status_display(InvoiceStatus::Confirmed));
    }

    #[test]
    fn pen_and_crypto_formatting() {
        assert_eq!(format_pen_amount(Decimal::new(150, 0)), "S/. 150.00");
        assert_eq!(format_pen_amount(Decimal::new(75005, 3)), "S/. 75.01");
        assert_eq!(format_crypto_amount("0.00234", Method::BtcLn), "0.00234000 ₿");
        assert_eq!(format_crypto_amount("25.5", Method::UsdcBase), "25.500000 ◊");
    }

    #[test]
    fn malformed_amounts_become_zero() {
        assert_eq!(coerce_amount("abc"), Decimal::ZERO);
        assert_eq!(coerce_amount(""), Decimal::ZERO);
        assert_eq!(coerce_amount(" 1e-3 "), Decimal::new(1, 3));
        assert_eq!(format_crypto_amount("n/a", Method::Btc), "0.00000000 ₿");
    }

    #[test]
    fn mock_conversion_matches_sample_invoice() {
        assert_eq!(convert_pen(Decimal::new(150, 0), Method::BtcLn), Decimal::new(234, 5));
        assert_eq!(
            rate_preview(Decimal::new(150, 0), Method::BtcLn).as_deref(),
            Some("≈ 0.00234000 BTC")
        );
        assert_eq!(
            rate_preview(Decimal::new(75, 0), Method::UsdcBase).as_deref(),
            Some("≈ 20.00 USDC")
        );
        assert_eq!(rate_preview(Decimal::ZERO, Method::Btc), None);
    }

    #[test]
    fn countdown_never_negative() {
        let expires = datetime!(2024-01-15 10:45 UTC);
        assert_eq!(
            time_remaining(expires, datetime!(2024-01-15 10:30 UTC)),
            Duration::from_secs(15 * 60)
        );
        assert_eq!(time_remaining(expires, expires), Duration::ZERO);
        assert_eq!(
            time_remaining(expires, datetime!(2030-01-01 00:00 UTC)),
            Duration::ZERO
        );
        assert!(is_expired(expires, datetime!(2024-01-15 10:45:01 UTC)));
        assert!(!is_expired(expires, expires));
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_time_remaining(Duration::from_millis(65_999)), "1:05");
        assert_eq!(format_time_remaining(Duration::ZERO), "0:00");
        assert_eq!(format_time_remaining(Duration::from_secs(90 * 60)), "90:00");
    }

    #[test]
    fn confirmations_and_labels() {
        assert_eq!(required_confirmations(Method::BtcLn), 0);
        assert_eq!(required_confirmations(Method::UsdcBase), 3);
        assert_eq!(expiration_label(15), "15 minutos");
        assert_eq!(expiration_label(60), "1 hora");
        assert_eq!(expiration_label(1440), "24 horas");
    }
}
