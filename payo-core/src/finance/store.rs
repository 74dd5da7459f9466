//! File-backed finance store.
//!
//! Every mutation rewrites the whole document. The new state is written to
//! a sibling temp file and renamed over the original, and only becomes the
//! in-memory state once the write succeeded.

use super::model::{Budget, FinanceState, Transaction};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid finance file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("amount must not be zero")]
    ZeroAmount,

    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl FinanceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug)]
pub struct FinanceStore {
    path: PathBuf,
    state: FinanceState,
}

impl FinanceStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FinanceError> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No finance file yet, starting empty");
                FinanceState::default()
            }
            Err(e) => return Err(FinanceError::io(&path, e)),
        };
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &FinanceState {
        &self.state
    }

    /// Newest first.
    pub fn txs(&self) -> &[Transaction] {
        &self.state.txs
    }

    pub fn budget(&self) -> Option<Budget> {
        self.state.budget
    }

    /// Monthly income from the budget, zero when unset.
    pub fn monthly_income(&self) -> Decimal {
        self.state
            .budget
            .map(|b| b.monthly_income)
            .unwrap_or(Decimal::ZERO)
    }

    /// Prepend a transaction and persist.
    pub fn add_tx(&mut self, tx: Transaction) -> Result<(), FinanceError> {
        if tx.amount.is_zero() {
            return Err(FinanceError::ZeroAmount);
        }
        let id = tx.id.clone();
        let mut next = self.state.clone();
        next.txs.insert(0, tx);
        self.commit(next)?;
        info!(tx_id = %id, "Transaction added");
        Ok(())
    }

    /// Remove a transaction by id and persist, returning it.
    pub fn remove_tx(&mut self, id: &str) -> Result<Transaction, FinanceError> {
        let index = self
            .state
            .txs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| FinanceError::NotFound(id.to_owned()))?;
        let mut next = self.state.clone();
        let removed = next.txs.remove(index);
        self.commit(next)?;
        info!(tx_id = %id, "Transaction removed");
        Ok(removed)
    }

    pub fn set_budget(&mut self, budget: Budget) -> Result<(), FinanceError> {
        let next = FinanceState {
            budget: Some(budget),
            ..self.state.clone()
        };
        self.commit(next)?;
        info!(monthly_income = %budget.monthly_income, "Budget set");
        Ok(())
    }

    /// Drop all transactions and the budget.
    pub fn clear(&mut self) -> Result<(), FinanceError> {
        self.commit(FinanceState::default())
    }

    /// Write the current state to disk.
    pub fn save(&self) -> Result<(), FinanceError> {
        write_atomic(&self.path, &self.state)
    }

    fn commit(&mut self, next: FinanceState) -> Result<(), FinanceError> {
        write_atomic(&self.path, &next)?;
        self.state = next;
        Ok(())
    }
}

fn write_atomic(path: &Path, state: &FinanceState) -> Result<(), FinanceError> {
    let content = serde_json::to_string_pretty(state)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FinanceError::io(parent, e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, content).map_err(|e| FinanceError::io(&temp_path, e))?;
    std::fs::rename(&temp_path, path).map_err(|e| FinanceError::io(path, e))?;
    debug!(path = %path.display(), txs = state.txs.len(), "Finance file written");
    Ok(())
}
