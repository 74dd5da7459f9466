//! Webhook signatures.
//!
//! The backend signs every webhook body with
//! `HMAC-SHA256(canonical_json, webhook_secret)` and sends the lowercase hex
//! digest in the `X-Signature` header. The canonical form is the JSON value
//! with object keys sorted, no insignificant whitespace and every non-ASCII
//! character written as a `\uXXXX` escape, so the signature does not depend
//! on how the sender laid out the body.
//!
//! Numbers are written the way `serde_json` writes them. Bodies signed by a
//! sender that prints small floats in exponent form (`1e-05`) do not verify.

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Header carrying the hex-encoded HMAC signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Compact output with non-ASCII characters escaped as lowercase UTF-16
/// `\u` sequences.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

fn to_canonical(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    value.serialize(&mut serializer)?;
    // Only ASCII is ever written.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Canonical JSON: sorted keys, compact separators, ASCII only.
///
/// Round-tripping through [`serde_json::Value`] sorts keys because its map
/// is ordered.
pub fn canonical_json<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    to_canonical(&serde_json::to_value(payload)?)
}

fn key(secret: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret)
}

/// Sign a payload, returning the lowercase hex digest.
pub fn sign_payload<T: Serialize>(payload: &T, secret: &[u8]) -> Result<String, SignatureError> {
    let canonical = canonical_json(payload)?;
    let tag = ring::hmac::sign(&key(secret), canonical.as_bytes());
    Ok(hex::encode(tag.as_ref()))
}

/// Verify a raw JSON body against a hex signature in constant time.
pub fn verify_body(body: &str, signature_hex: &str, secret: &[u8]) -> Result<(), SignatureError> {
    let signature = hex::decode(signature_hex.trim()).map_err(|_| SignatureError::InvalidHex)?;
    let value: serde_json::Value = serde_json::from_str(body)?;
    let canonical = to_canonical(&value)?;
    ring::hmac::verify(&key(secret), canonical.as_bytes(), &signature)?;
    Ok(())
}
