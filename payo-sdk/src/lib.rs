//! Shared types and helpers for the Payo invoicing API.
//!
//! * [`objects`] – wire types for invoices, payments, webhooks and settings.
//! * [`rules`] – pure display and payment-rule helpers.
//! * [`signature`] – webhook HMAC signing and verification.
//! * [`client`] – typed HTTP client, behind the `client` feature.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
pub mod rules;
pub mod signature;
