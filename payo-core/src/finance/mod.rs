//! Personal finance tracker.
//!
//! A list of income/expense transactions plus an optional monthly budget,
//! persisted as one JSON document. Independent of the invoicing side.

pub mod alerts;
pub mod model;
pub mod store;

pub use alerts::{evaluate_alerts, month_key, Alert, MonthlyTotals, OVERSPEND_RATIO};
pub use model::{Budget, Category, FinanceState, Transaction, TxType};
pub use store::{FinanceError, FinanceStore};
