//! Live client for the invoicing API.
//!
//! Requests carry JSON bodies and no authentication. Any non-2xx answer
//! becomes [`ClientError::Api`] with the status and the raw body; there is
//! no retry.

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{ClientError, InvoiceApi, parse_response};
use crate::config::{ApiConfig, Endpoints};
use crate::objects::{
    CreateInvoiceRequest, CreateInvoiceResponse, ExchangeRates, HealthStatus, InvoiceFilters,
    InvoiceWithPayment,
};

/// Typed HTTP client for the invoicing API.
#[derive(Debug, Clone)]
pub struct HttpInvoiceApi {
    http: Client,
    base_url: Url,
}

impl HttpInvoiceApi {
    /// Create a new `HttpInvoiceApi`.
    ///
    /// * `base_url` – root URL of the backend (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Build a client from [`ApiConfig`], applying its timeout if set.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        parse_response(resp).await
    }
}

#[async_trait::async_trait]
impl InvoiceApi for HttpInvoiceApi {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.base_url.join(Endpoints::HEALTH)?;
        self.get(url).await
    }

    async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<CreateInvoiceResponse, ClientError> {
        let url = self.base_url.join(Endpoints::INVOICES)?;
        debug!(%url, method = %request.method, "POST");

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        parse_response(resp).await
    }

    async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceWithPayment, ClientError> {
        let url = self.base_url.join(&format!(
            "{}/{}",
            Endpoints::INVOICES,
            urlencoding::encode(invoice_id)
        ))?;
        self.get(url).await
    }

    async fn list_invoices(
        &self,
        filters: &InvoiceFilters,
    ) -> Result<Vec<InvoiceWithPayment>, ClientError> {
        let mut url = self.base_url.join(Endpoints::INVOICES)?;
        if !filters.is_empty() {
            url.set_query(Some(&filters.to_query_string()));
        }
        self.get(url).await
    }

    async fn exchange_rates(&self) -> Result<ExchangeRates, ClientError> {
        let url = self.base_url.join(Endpoints::EXCHANGE_RATES)?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{InvoiceStatus, Method};
    use mockito::Matcher;
    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    const INVOICE: &str = r#"{
        "id": "inv_1",
        "amount_pen": 150.0,
        "amount_crypto": "0.00234",
        "asset": "BTC",
        "chain": "bitcoin",
        "method": "BTC_LN",
        "description": "Consultoría web",
        "address_or_pr": "lnbc1234567890",
        "status": "detected",
        "expires_at": "2024-01-15T10:45:00Z",
        "created_at": "2024-01-15T10:30:00Z",
        "updated_at": "2024-01-15T10:35:00Z",
        "payment_url": "https://payo.app/pay/inv_1",
        "qr_data": "payo:inv_1",
        "payment": {
            "id": "pay_1",
            "invoice_id": "inv_1",
            "tx_hash": "abc123",
            "amount_received": "0.00234",
            "confirmations": 0,
            "detected_at": "2024-01-15T10:35:00Z"
        },
        "state_timeline": [
            {"status": "pending", "at": "2024-01-15T10:30:00Z"},
            {"status": "detected", "at": "2024-01-15T10:35:00Z"}
        ]
    }"#;

    fn client(server: &mockito::ServerGuard) -> HttpInvoiceApi {
        HttpInvoiceApi::new(Url::parse(&server.url()).unwrap())
    }

    #[tokio::test]
    async fn get_invoice_parses_detail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/invoices/inv_1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(INVOICE)
            .create_async()
            .await;

        let invoice = client(&server).get_invoice("inv_1").await.unwrap();
        mock.assert_async().await;

        assert_eq!(invoice.status(), InvoiceStatus::Detected);
        assert_eq!(invoice.invoice.amount_pen, Decimal::new(150, 0));
        assert_eq!(invoice.state_timeline.len(), 2);
        assert_eq!(invoice.payment.unwrap().confirmations, 0);
    }

    #[tokio::test]
    async fn non_success_surfaces_status_and_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/invoices/missing")
            .with_status(404)
            .with_body(r#"{"detail":"Invoice not found"}"#)
            .create_async()
            .await;

        let err = client(&server).get_invoice("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        let message = err.to_string();
        assert!(message.contains("404 Not Found"), "{message}");
        assert!(message.contains("Invoice not found"), "{message}");
    }

    #[tokio::test]
    async fn error_without_body_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).health().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(matches!(err, ClientError::Api { ref body, .. } if body.is_empty()));
    }

    #[tokio::test]
    async fn list_sends_filters_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/invoices")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("status".into(), "pending".into()),
                Matcher::UrlEncoded("method".into(), "USDC_BASE".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let filters = InvoiceFilters {
            status: Some(InvoiceStatus::Pending),
            method: Some(Method::UsdcBase),
            ..Default::default()
        };
        let invoices = client(&server).list_invoices(&filters).await.unwrap();
        mock.assert_async().await;
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn create_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/invoices")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "amount_pen": 150.0,
                "method": "BTC_LN",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "invoice_id": "inv_9",
                "method": "BTC_LN",
                "amount_pen": 150.0,
                "amount_crypto": "0.00234000",
                "asset": "BTC",
                "chain": "bitcoin",
                "address_or_pr": "lnbc234001p",
                "expires_at": "2024-01-15T10:45:00Z",
                "payment_url": "https://payo.app/pay/inv_9",
                "qr_data": "payo:inv_9"
            }"#,
            )
            .create_async()
            .await;

        let request = CreateInvoiceRequest {
            amount_pen: Decimal::new(150, 0),
            method: Method::BtcLn,
            description: None,
        };
        let created = client(&server).create_invoice(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(created.invoice_id, "inv_9");
        assert_eq!(created.qr_data, "payo:inv_9");
    }

    #[tokio::test]
    async fn invalid_json_is_a_json_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/exchange-rates")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server).exchange_rates().await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}
