//! Dashboard aggregates over a list of invoices.

use itertools::Itertools;
use payo_sdk::objects::{InvoiceStatus, InvoiceWithPayment};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceSummary {
    pub total: usize,
    pub by_status: HashMap<InvoiceStatus, usize>,
    /// Sum of `amount_pen` over confirmed invoices.
    pub confirmed_pen: Decimal,
    /// Sum of `amount_pen` over invoices still awaiting payment.
    pub open_pen: Decimal,
}

impl InvoiceSummary {
    pub fn from_invoices(invoices: &[InvoiceWithPayment]) -> Self {
        let sum_where = |pred: fn(InvoiceStatus) -> bool| -> Decimal {
            invoices
                .iter()
                .filter(|i| pred(i.status()))
                .map(|i| i.invoice.amount_pen)
                .sum()
        };

        Self {
            total: invoices.len(),
            by_status: invoices.iter().map(InvoiceWithPayment::status).counts(),
            confirmed_pen: sum_where(|s| s == InvoiceStatus::Confirmed),
            open_pen: sum_where(|s| !s.is_terminal()),
        }
    }

    pub fn count(&self, status: InvoiceStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Counts for every status in lifecycle order, zeros included.
    pub fn counts(&self) -> impl Iterator<Item = (InvoiceStatus, usize)> + '_ {
        InvoiceStatus::ALL.into_iter().map(|s| (s, self.count(s)))
    }
}
