use crate::config::RuntimeConfig;
use crate::views;
use clap::Subcommand;
use payo_core::finance::{
    evaluate_alerts, month_key, Budget, Category, FinanceStore, MonthlyTotals, Transaction, TxType,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

#[derive(Subcommand, Debug)]
pub enum FinanceCommand {
    /// Record an expense or income
    Add {
        #[arg(long)]
        amount: Decimal,
        /// gasto or ingreso
        #[arg(long = "type", default_value = "gasto")]
        tx_type: TxType,
        /// comida, transporte, ocio, inversion or otros
        #[arg(long, default_value = "comida")]
        category: Category,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a transaction
    Remove { id: String },
    /// List transactions and the month's totals
    List {
        /// Month as YYYY-MM; defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// List every transaction, not only the month's
        #[arg(long)]
        all: bool,
    },
    /// Set the monthly income used for alerts
    Budget { monthly_income: Decimal },
    /// Spending alerts for a month
    Alerts {
        #[arg(long)]
        month: Option<String>,
    },
    /// Remove every transaction and the budget
    Clear,
}

pub fn run(command: FinanceCommand, config: &RuntimeConfig) -> anyhow::Result<()> {
    let mut store = FinanceStore::load(&config.finance_path)?;
    let current_month = || month_key(OffsetDateTime::now_utc());

    match command {
        FinanceCommand::Add {
            amount,
            tx_type,
            category,
            note,
        } => {
            let tx = Transaction::new(amount, tx_type, category, note, OffsetDateTime::now_utc())?;
            let id = tx.id.clone();
            store.add_tx(tx)?;
            println!("Transacción guardada: {id}");
            print_alerts(&store, &current_month());
        }
        FinanceCommand::Remove { id } => {
            let removed = store.remove_tx(&id)?;
            println!("Transacción eliminada: {}", removed.id);
        }
        FinanceCommand::List { month, all } => {
            let month = month.unwrap_or_else(current_month);
            let txs: Vec<Transaction> = if all {
                store.txs().to_vec()
            } else {
                store
                    .txs()
                    .iter()
                    .filter(|t| t.date.starts_with(&month))
                    .cloned()
                    .collect()
            };
            println!("{}", views::transactions(&txs));
            println!();
            let totals = MonthlyTotals::for_month(store.txs(), &month);
            println!("{}", views::month_overview(&month, &totals, store.budget()));
        }
        FinanceCommand::Budget { monthly_income } => {
            store.set_budget(Budget { monthly_income })?;
            println!("Ingreso mensual: {}", payo_sdk::rules::format_pen_amount(monthly_income));
        }
        FinanceCommand::Alerts { month } => {
            print_alerts(&store, &month.unwrap_or_else(current_month));
        }
        FinanceCommand::Clear => {
            store.clear()?;
            println!("Datos eliminados");
        }
    }
    Ok(())
}

fn print_alerts(store: &FinanceStore, month: &str) {
    let alerts = evaluate_alerts(store.txs(), store.monthly_income(), month);
    println!("{}", views::alerts(&alerts));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, Overrides};
    use tempfile::TempDir;

    #[test]
    fn commands_persist_to_configured_store() {
        let dir = TempDir::new().unwrap();
        let mut config = ConfigLoader::new(dir.path().join("payo.toml"), Overrides::default())
            .load()
            .unwrap();
        config.finance_path = dir.path().join("data").join("finance.json");

        run(
            FinanceCommand::Budget {
                monthly_income: Decimal::new(3000, 0),
            },
            &config,
        )
        .unwrap();
        run(
            FinanceCommand::Add {
                amount: Decimal::new(45, 0),
                tx_type: TxType::Expense,
                category: Category::Food,
                note: None,
            },
            &config,
        )
        .unwrap();

        let store = FinanceStore::load(&config.finance_path).unwrap();
        assert_eq!(store.txs().len(), 1);
        assert_eq!(store.monthly_income(), Decimal::new(3000, 0));

        run(FinanceCommand::Clear, &config).unwrap();
        let store = FinanceStore::load(&config.finance_path).unwrap();
        assert!(store.txs().is_empty());
        assert!(store.budget().is_none());
    }
}
