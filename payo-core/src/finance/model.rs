use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    #[serde(rename = "gasto")]
    Expense,
    #[serde(rename = "ingreso")]
    Income,
}

impl TxType {
    pub fn as_str(self) -> &'static str {
        match self {
            TxType::Expense => "gasto",
            TxType::Income => "ingreso",
        }
    }
}

impl std::fmt::Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gasto" | "expense" => Ok(TxType::Expense),
            "ingreso" | "income" => Ok(TxType::Income),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "comida")]
    Food,
    #[serde(rename = "transporte")]
    Transport,
    #[serde(rename = "ocio")]
    Leisure,
    #[serde(rename = "inversion")]
    Investment,
    #[serde(rename = "otros")]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Leisure,
        Category::Investment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "comida",
            Category::Transport => "transporte",
            Category::Leisure => "ocio",
            Category::Investment => "inversion",
            Category::Other => "otros",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower || format!("{c:?}").eq_ignore_ascii_case(&lower))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// One income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// RFC 3339 timestamp. Kept as a string so month grouping is a plain
    /// prefix match.
    pub date: String,
}

impl Transaction {
    /// A new transaction with a fresh id, dated `at`.
    pub fn new(
        amount: Decimal,
        tx_type: TxType,
        category: Category,
        note: Option<String>,
        at: OffsetDateTime,
    ) -> Result<Self, time::error::Format> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            amount,
            tx_type,
            category,
            note: note.filter(|n| !n.trim().is_empty()),
            date: at.format(&Rfc3339)?,
        })
    }

    pub fn is_expense(&self) -> bool {
        self.tx_type == TxType::Expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "monthlyIncome", with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
}

/// Everything the tracker persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceState {
    /// Newest first.
    #[serde(default)]
    pub txs: Vec<Transaction>,
    #[serde(default)]
    pub budget: Option<Budget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn wire_names_are_spanish() {
        let tx = Transaction::new(
            Decimal::new(255, 1),
            TxType::Expense,
            Category::Food,
            Some("  ".into()),
            datetime!(2024-03-05 12:00 UTC),
        )
        .unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "gasto");
        assert_eq!(json["category"], "comida");
        assert_eq!(json["amount"], 25.5);
        assert_eq!(json["date"], "2024-03-05T12:00:00Z");
        assert!(json.get("note").is_none());

        let budget: Budget = serde_json::from_str(r#"{"monthlyIncome": 3000}"#).unwrap();
        assert_eq!(budget.monthly_income, Decimal::new(3000, 0));
    }

    #[test]
    fn parses_either_language() {
        assert_eq!("ingreso".parse::<TxType>().unwrap(), TxType::Income);
        assert_eq!("Expense".parse::<TxType>().unwrap(), TxType::Expense);
        assert_eq!("inversion".parse::<Category>().unwrap(), Category::Investment);
        assert_eq!("transport".parse::<Category>().unwrap(), Category::Transport);
        assert!("salud".parse::<Category>().is_err());
    }
}
