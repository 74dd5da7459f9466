//! Query cache over an [`InvoiceApi`].
//!
//! Detail and list results are cached by invoice id and by the filter query
//! string. An entry is served from cache while younger than the stale time;
//! a stale time of zero means every read goes to the backend. Creating an
//! invoice invalidates all cached lists.

use crate::processors::InvoicePoller;
use payo_sdk::client::{ClientError, InvoiceApi};
use payo_sdk::objects::{
    CreateInvoiceRequest, CreateInvoiceResponse, ExchangeRates, HealthStatus, InvoiceFilters,
    InvoiceWithPayment,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn fresh(&self, stale_time: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < stale_time).then(|| self.value.clone())
    }
}

pub struct InvoiceQueries {
    api: Arc<dyn InvoiceApi>,
    stale_time: Duration,
    invoices: RwLock<HashMap<String, Cached<InvoiceWithPayment>>>,
    lists: RwLock<HashMap<String, Cached<Vec<InvoiceWithPayment>>>>,
}

impl InvoiceQueries {
    /// A cache that always refetches.
    pub fn new(api: Arc<dyn InvoiceApi>) -> Self {
        Self::with_stale_time(api, Duration::ZERO)
    }

    pub fn with_stale_time(api: Arc<dyn InvoiceApi>, stale_time: Duration) -> Self {
        Self {
            api,
            stale_time,
            invoices: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &Arc<dyn InvoiceApi> {
        &self.api
    }

    /// Invoice detail by id.
    pub async fn invoice(&self, invoice_id: &str) -> Result<InvoiceWithPayment, ClientError> {
        if let Some(hit) = self
            .invoices
            .read()
            .await
            .get(invoice_id)
            .and_then(|c| c.fresh(self.stale_time))
        {
            debug!(invoice_id, "Invoice served from cache");
            return Ok(hit);
        }

        let invoice = self.api.get_invoice(invoice_id).await?;
        self.invoices
            .write()
            .await
            .insert(invoice_id.to_owned(), Cached::new(invoice.clone()));
        Ok(invoice)
    }

    /// Invoice list for `filters`.
    pub async fn invoices(
        &self,
        filters: &InvoiceFilters,
    ) -> Result<Vec<InvoiceWithPayment>, ClientError> {
        let key = filters.to_query_string();
        if let Some(hit) = self
            .lists
            .read()
            .await
            .get(&key)
            .and_then(|c| c.fresh(self.stale_time))
        {
            debug!(filters = %key, "Invoice list served from cache");
            return Ok(hit);
        }

        let invoices = self.api.list_invoices(filters).await?;
        self.lists
            .write()
            .await
            .insert(key, Cached::new(invoices.clone()));
        Ok(invoices)
    }

    /// Create an invoice. On success every cached list is dropped.
    pub async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<CreateInvoiceResponse, ClientError> {
        let created = self.api.create_invoice(request).await?;
        self.invalidate_lists().await;
        info!(
            invoice_id = %created.invoice_id,
            method = %created.method,
            amount_pen = %created.amount_pen,
            "Invoice created"
        );
        Ok(created)
    }

    pub async fn invalidate_invoice(&self, invoice_id: &str) {
        self.invoices.write().await.remove(invoice_id);
    }

    pub async fn invalidate_lists(&self) {
        let mut lists = self.lists.write().await;
        if !lists.is_empty() {
            debug!(count = lists.len(), "Invalidating cached invoice lists");
        }
        lists.clear();
    }

    /// Last fetched detail, fresh or not.
    pub async fn cached_invoice(&self, invoice_id: &str) -> Option<InvoiceWithPayment> {
        self.invoices
            .read()
            .await
            .get(invoice_id)
            .map(|c| c.value.clone())
    }

    pub async fn exchange_rates(&self) -> Result<ExchangeRates, ClientError> {
        self.api.exchange_rates().await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.api.health().await
    }

    /// A poller for `invoice_id` sharing this cache's backend.
    pub fn poller(&self, invoice_id: impl Into<String>, interval: Duration) -> InvoicePoller {
        InvoicePoller::new(self.api.clone(), invoice_id, interval)
    }
}
