//! HTTP client for the Payo invoicing API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.
//!
//! [`InvoiceApi`] is the seam between the application and the backend:
//! [`HttpInvoiceApi`] talks to a live server, and other implementations
//! (such as the in-memory mock in `payo-core`) can stand in for it.

mod http;
mod webhook;

pub use http::HttpInvoiceApi;
pub use webhook::verify_webhook;

pub use reqwest::StatusCode;

use crate::objects::{
    CreateInvoiceRequest, CreateInvoiceResponse, ExchangeRates, HealthStatus, InvoiceFilters,
    InvoiceWithPayment,
};
use tracing::debug;

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status of an API error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Operations of the invoicing API.
#[async_trait::async_trait]
pub trait InvoiceApi: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, ClientError>;

    /// `POST /api/invoices`
    async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<CreateInvoiceResponse, ClientError>;

    /// `GET /api/invoices/{id}`
    async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceWithPayment, ClientError>;

    /// `GET /api/invoices?{filters}`
    async fn list_invoices(
        &self,
        filters: &InvoiceFilters,
    ) -> Result<Vec<InvoiceWithPayment>, ClientError>;

    /// `GET /api/exchange-rates`
    async fn exchange_rates(&self) -> Result<ExchangeRates, ClientError>;
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|e| {
            debug!(%status, error = %e, "Failed to read error response body");
            String::new()
        });
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
