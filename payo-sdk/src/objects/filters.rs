//! Query filters for the invoice list endpoint.

use crate::objects::method::Method;
use crate::objects::status::InvoiceStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Optional filters for `GET /api/invoices`.
///
/// Unset fields are omitted from the query string, so the default value
/// lists everything with the backend's own paging defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl InvoiceFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render the filters as a URL query string without the leading `?`.
    ///
    /// Pairs are emitted in a fixed order so the string doubles as a cache
    /// key.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let Some(method) = self.method {
            pairs.push(("method", method.as_str().to_owned()));
        }
        for (key, value) in [("from", self.from), ("to", self.to)] {
            if let Some(ts) = value {
                match ts.format(&Rfc3339) {
                    Ok(formatted) => pairs.push((key, formatted)),
                    Err(e) => tracing::warn!(key, error = %e, "Dropping unformattable date filter"),
                }
            }
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Client-side filter, used by the mock backend.
    pub fn matches(&self, status: InvoiceStatus, method: Method, created_at: OffsetDateTime) -> bool {
        self.status.is_none_or(|s| s == status)
            && self.method.is_none_or(|m| m == method)
            && self.from.is_none_or(|from| created_at >= from)
            && self.to.is_none_or(|to| created_at <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn empty_filters_render_nothing() {
        assert!(InvoiceFilters::default().is_empty());
        assert_eq!(InvoiceFilters::default().to_query_string(), "");
    }

    #[test]
    fn query_string_is_encoded_and_ordered() {
        let filters = InvoiceFilters {
            status: Some(InvoiceStatus::Pending),
            method: Some(Method::BtcLn),
            from: Some(datetime!(2024-01-15 10:30 +00:00)),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query_string(),
            "status=pending&method=BTC_LN&from=2024-01-15T10%3A30%3A00Z&limit=20"
        );
    }

    #[test]
    fn matches_applies_every_set_field() {
        let filters = InvoiceFilters {
            method: Some(Method::UsdcBase),
            to: Some(datetime!(2024-01-31 00:00 UTC)),
            ..Default::default()
        };
        let created = datetime!(2024-01-15 14:20 UTC);
        assert!(filters.matches(InvoiceStatus::Pending, Method::UsdcBase, created));
        assert!(!filters.matches(InvoiceStatus::Pending, Method::Btc, created));
        assert!(!filters.matches(
            InvoiceStatus::Pending,
            Method::UsdcBase,
            datetime!(2024-02-01 00:00 UTC)
        ));
    }
}
