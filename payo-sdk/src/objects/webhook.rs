//! Webhook payload sent by the backend when an invoice changes status.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::method::Method;
use super::status::InvoiceStatus;

/// Event discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "invoice.updated")]
    InvoiceUpdated,
}

/// Webhook payload for invoice status change events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    pub invoice_id: String,
    pub status: InvoiceStatus,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub amount_expected: String,
    pub amount_received: String,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_payload() {
        let json = r#"{
            "type": "invoice.updated",
            "invoice_id": "inv_1",
            "status": "confirmed",
            "method": "BTC_LN",
            "tx_hash": "abc123",
            "amount_expected": "0.00234",
            "amount_received": "0.00234",
            "received_at": "2024-01-15T10:40:00Z"
        }"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.event_type, WebhookEventType::InvoiceUpdated);
        assert_eq!(payload.status, InvoiceStatus::Confirmed);
        assert_eq!(payload.tx_hash.as_deref(), Some("abc123"));
    }
}
