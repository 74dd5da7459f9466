//! Webhook signature verification helper.

use crate::signature::{verify_body, SignatureError};

/// Verify and deserialize an incoming webhook.
///
/// * `signature_header` – value of the `X-Signature` request header.
/// * `body` – raw JSON request body string.
/// * `secret` – the webhook secret configured in the merchant settings.
///
/// # Example
///
/// ```ignore
/// use payo_sdk::client::verify_webhook;
/// use payo_sdk::objects::WebhookPayload;
///
/// let payload: WebhookPayload = verify_webhook(signature_header, &body, secret)?;
/// ```
pub fn verify_webhook<T: serde::de::DeserializeOwned>(
    signature_header: &str,
    body: &str,
    secret: &[u8],
) -> Result<T, SignatureError> {
    verify_body(body, signature_header, secret)?;
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{InvoiceStatus, WebhookPayload};
    use crate::signature::sign_payload;

    const BODY: &str = r#"{"type":"invoice.updated","invoice_id":"inv_1","status":"detected","method":"BTC","tx_hash":"abc123","amount_expected":"0.00234","amount_received":"0.00234","received_at":"2024-01-15T10:35:00Z"}"#;

    #[test]
    fn verified_payload_is_returned() {
        let value: serde_json::Value = serde_json::from_str(BODY).unwrap();
        let signature = sign_payload(&value, b"secret").unwrap();

        let payload: WebhookPayload = verify_webhook(&signature, BODY, b"secret").unwrap();
        assert_eq!(payload.invoice_id, "inv_1");
        assert_eq!(payload.status, InvoiceStatus::Detected);
    }

    #[test]
    fn bad_signature_is_not_parsed() {
        let result: Result<WebhookPayload, _> = verify_webhook(&"00".repeat(32), BODY, b"secret");
        assert!(matches!(result, Err(SignatureError::SignatureMismatch)));
    }
}
