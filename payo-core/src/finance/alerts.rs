//! Monthly totals and overspend alerts.
//!
//! Months are matched by string prefix: a transaction belongs to `2024-03`
//! iff its `date` starts with `2024-03`.

use super::model::{Transaction, TxType};
use payo_sdk::rules::format_pen_amount;
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Share of monthly income that expenses may reach before alerting.
pub const OVERSPEND_RATIO: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// `YYYY-MM` for `date`.
pub fn month_key(date: OffsetDateTime) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl MonthlyTotals {
    pub fn for_month(txs: &[Transaction], month: &str) -> Self {
        txs.iter()
            .filter(|t| t.date.starts_with(month))
            .fold(Self::default(), |mut totals, t| {
                match t.tx_type {
                    TxType::Income => totals.income += t.amount,
                    TxType::Expense => totals.expenses += t.amount,
                }
                totals
            })
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Expenses for `month` exceed [`OVERSPEND_RATIO`] of monthly income.
    Overspend {
        month: String,
        expenses: Decimal,
        limit: Decimal,
    },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::Overspend {
                month,
                expenses,
                limit,
            } => write!(
                f,
                "Tus gastos de {month} ({}) superan el 30% de tu ingreso mensual ({}).",
                format_pen_amount(*expenses),
                format_pen_amount(*limit),
            ),
        }
    }
}

/// Alerts for `month` given the budget's monthly income (zero when no
/// budget is set).
pub fn evaluate_alerts(txs: &[Transaction], monthly_income: Decimal, month: &str) -> Vec<Alert> {
    let expenses = MonthlyTotals::for_month(txs, month).expenses;
    let limit = monthly_income * OVERSPEND_RATIO;
    let mut alerts = Vec::new();
    if expenses > limit {
        alerts.push(Alert::Overspend {
            month: month.to_owned(),
            expenses,
            limit,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::model::Category;
    use time::macros::datetime;

    fn tx(amount: i64, tx_type: TxType, date: &str) -> Transaction {
        Transaction {
            id: format!("{date}-{amount}"),
            amount: Decimal::new(amount, 0),
            tx_type,
            category: Category::Food,
            note: None,
            date: date.to_owned(),
        }
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(datetime!(2024-03-05 12:00 UTC)), "2024-03");
        assert_eq!(month_key(datetime!(2024-11-30 23:59 UTC)), "2024-11");
    }

    #[test]
    fn totals_only_count_the_month() {
        let txs = [
            tx(100, TxType::Expense, "2024-03-02T10:00:00Z"),
            tx(50, TxType::Expense, "2024-03-31T23:00:00Z"),
            tx(2000, TxType::Income, "2024-03-01T08:00:00Z"),
            tx(999, TxType::Expense, "2024-04-01T00:00:00Z"),
        ];
        let totals = MonthlyTotals::for_month(&txs, "2024-03");
        assert_eq!(totals.expenses, Decimal::new(150, 0));
        assert_eq!(totals.income, Decimal::new(2000, 0));
        assert_eq!(totals.balance(), Decimal::new(1850, 0));
    }

    #[test]
    fn overspend_fires_strictly_above_thirty_percent() {
        let income = Decimal::new(1000, 0);
        let at_limit = [tx(300, TxType::Expense, "2024-03-10T00:00:00Z")];
        assert!(evaluate_alerts(&at_limit, income, "2024-03").is_empty());

        let above = [
            tx(300, TxType::Expense, "2024-03-10T00:00:00Z"),
            tx(1, TxType::Expense, "2024-03-11T00:00:00Z"),
        ];
        let alerts = evaluate_alerts(&above, income, "2024-03");
        assert_eq!(
            alerts,
            vec![Alert::Overspend {
                month: "2024-03".into(),
                expenses: Decimal::new(301, 0),
                limit: Decimal::new(300, 0),
            }]
        );
        assert_eq!(
            alerts[0].to_string(),
            "Tus gastos de 2024-03 (S/. 301.00) superan el 30% de tu ingreso mensual (S/. 300.00)."
        );
    }

    #[test]
    fn other_months_and_income_do_not_count() {
        let income = Decimal::new(1000, 0);
        let txs = [
            tx(5000, TxType::Expense, "2024-02-28T00:00:00Z"),
            tx(5000, TxType::Income, "2024-03-01T00:00:00Z"),
        ];
        assert!(evaluate_alerts(&txs, income, "2024-03").is_empty());
    }

    #[test]
    fn without_income_any_expense_alerts() {
        let txs = [tx(1, TxType::Expense, "2024-03-10T00:00:00Z")];
        assert_eq!(evaluate_alerts(&txs, Decimal::ZERO, "2024-03").len(), 1);
        assert!(evaluate_alerts(&[], Decimal::ZERO, "2024-03").is_empty());
    }
}
