//! Coercion report structures
//!
//! One report is produced per export. It is handed back to the caller for
//! diagnostics and never persisted.

use crate::domain::errors::CoercionError;
use serde::{Deserialize, Serialize};

/// What happened to one column during coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CoercionOutcome {
    /// Already floating point, passed through
    Unchanged,

    /// Converted element-wise
    Coerced {
        /// Source type name
        from: String,
        /// Rows whose present value could not be converted and became missing
        invalid_rows: Vec<usize>,
    },

    /// No element could be converted
    Failed {
        /// Why the column was rejected
        reason: String,
    },
}

/// Report entry for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCoercion {
    /// Position in the dataset
    pub position: usize,

    /// Column label
    pub column: String,

    /// Outcome
    #[serde(flatten)]
    pub outcome: CoercionOutcome,
}

/// Per-column record of a coercion pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionReport {
    /// Entries in dataset order
    pub columns: Vec<ColumnCoercion>,
}

impl CoercionReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for a column
    pub fn record(&mut self, position: usize, column: impl Into<String>, outcome: CoercionOutcome) {
        self.columns.push(ColumnCoercion {
            position,
            column: column.into(),
            outcome,
        });
    }

    /// Outcome of the first column with this label
    pub fn outcome(&self, column: &str) -> Option<&CoercionOutcome> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.outcome)
    }

    /// Labels of columns that were converted
    pub fn coerced_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| matches!(c.outcome, CoercionOutcome::Coerced { .. }))
            .map(|c| c.column.as_str())
    }

    /// Entries that failed
    pub fn failures(&self) -> impl Iterator<Item = &ColumnCoercion> {
        self.columns
            .iter()
            .filter(|c| matches!(c.outcome, CoercionOutcome::Failed { .. }))
    }

    /// First failed column as a [`CoercionError`]
    pub fn first_failure(&self) -> Option<CoercionError> {
        self.failures().next().map(|entry| CoercionError {
            column: entry.column.clone(),
            position: entry.position,
            reason: match &entry.outcome {
                CoercionOutcome::Failed { reason } => reason.clone(),
                _ => String::new(),
            },
        })
    }

    /// Number of values that became missing during conversion
    pub fn invalid_value_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| match &c.outcome {
                CoercionOutcome::Coerced { invalid_rows, .. } => invalid_rows.len(),
                _ => 0,
            })
            .sum()
    }

    /// Log the report
    pub fn log_summary(&self) {
        let coerced = self.coerced_columns().count();
        let failed = self.failures().count();
        tracing::info!(
            columns = self.columns.len(),
            coerced,
            failed,
            invalid_values = self.invalid_value_count(),
            "Coercion complete"
        );

        for entry in &self.columns {
            match &entry.outcome {
                CoercionOutcome::Coerced { from, invalid_rows } if !invalid_rows.is_empty() => {
                    tracing::warn!(
                        column = %entry.column,
                        from = %from,
                        invalid_values = invalid_rows.len(),
                        first_invalid_row = invalid_rows[0],
                        "Values replaced with missing markers"
                    );
                }
                CoercionOutcome::Failed { reason } => {
                    tracing::error!(column = %entry.column, reason = %reason, "Column coercion failed");
                }
                _ => {}
            }
        }
    }
}
