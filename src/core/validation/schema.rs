//! Dataset schema validation
//!
//! Checks run in a fixed order so the reported error is deterministic: index type,
//! emptiness, labels, column lengths, then per-column convertibility. All
//! unconvertible columns are collected before failing.

use super::classify::{classify_column, ColumnKind};
use crate::domain::dataset::Dataset;
use crate::domain::errors::{ColumnViolation, SchemaError, SchemaErrorKind};
use serde::{Deserialize, Serialize};

/// Classification of one validated column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    /// Position in the dataset
    pub position: usize,

    /// Column label
    pub label: String,

    /// Recorded kind
    pub kind: ColumnKind,
}

/// Schema of a dataset that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSchema {
    /// Number of rows
    pub row_count: usize,

    /// Columns in dataset order
    pub columns: Vec<ClassifiedColumn>,
}

impl ValidatedSchema {
    /// Columns that need conversion
    pub fn convertible_columns(&self) -> impl Iterator<Item = &ClassifiedColumn> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::ConvertibleToNumeric)
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every column can be exported
    Valid(ValidatedSchema),
    /// The dataset cannot be exported
    Invalid(SchemaError),
}

impl ValidationResult {
    /// True for [`ValidationResult::Valid`]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// The error, if invalid
    pub fn error(&self) -> Option<&SchemaError> {
        match self {
            ValidationResult::Invalid(err) => Some(err),
            ValidationResult::Valid(_) => None,
        }
    }

    /// Converts into a `Result` for use with `?`
    pub fn into_result(self) -> Result<ValidatedSchema, SchemaError> {
        match self {
            ValidationResult::Valid(schema) => Ok(schema),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Validates that a dataset can be mapped onto sessions and channels
///
/// # Arguments
///
/// * `dataset` - Dataset to inspect, never modified
///
/// # Returns
///
/// [`ValidationResult::Valid`] with the per-column classification, or
/// [`ValidationResult::Invalid`] with the first structural defect found. Unconvertible
/// columns are all reported together.
///
/// # Examples
///
/// ```
/// use sessionframe::core::validation::validate;
/// use sessionframe::domain::{Column, Dataset, Index, SchemaErrorKind};
///
/// let dataset = Dataset::builder()
///     .index(Index::Integer(vec![0, 1]))
///     .column("speed", Column::Float(vec![1.0, 2.0]))
///     .build();
///
/// let result = validate(&dataset);
/// assert!(matches!(
///     result.error().map(|e| &e.kind),
///     Some(SchemaErrorKind::NonDateTimeIndex { .. })
/// ));
/// ```
pub fn validate(dataset: &Dataset) -> ValidationResult {
    match check(dataset) {
        Ok(schema) => {
            tracing::debug!(
                rows = schema.row_count,
                columns = schema.columns.len(),
                "Dataset schema validated"
            );
            ValidationResult::Valid(schema)
        }
        Err(kind) => {
            tracing::debug!(error = %kind, "Dataset schema rejected");
            ValidationResult::Invalid(SchemaError::new(kind))
        }
    }
}

fn check(dataset: &Dataset) -> Result<ValidatedSchema, SchemaErrorKind> {
    let index = dataset.index();
    if index.as_datetime().is_none() {
        return Err(SchemaErrorKind::NonDateTimeIndex {
            found: index.type_name().to_string(),
        });
    }

    if dataset.column_count() == 0 || dataset.row_count() == 0 {
        return Err(SchemaErrorKind::EmptyDataset);
    }

    let row_count = dataset.row_count();
    let mut columns = Vec::with_capacity(dataset.column_count());
    let mut violations = Vec::new();

    for (position, (label, column)) in dataset.columns().iter().enumerate() {
        if label.trim().is_empty() {
            return Err(SchemaErrorKind::BlankColumnLabel { position });
        }

        if column.len() != row_count {
            return Err(SchemaErrorKind::RaggedColumn {
                column: label.clone(),
                expected: row_count,
                actual: column.len(),
            });
        }

        let (kind, reason) = classify_column(column);
        if kind == ColumnKind::Unconvertible {
            violations.push(ColumnViolation::new(
                position,
                label.as_str(),
                reason.unwrap_or_else(|| column.type_name().to_string()),
            ));
        }

        columns.push(ClassifiedColumn {
            position,
            label: label.clone(),
            kind,
        });
    }

    if !violations.is_empty() {
        return Err(SchemaErrorKind::NonNumericColumns { violations });
    }

    Ok(ValidatedSchema { row_count, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, Index};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn index3() -> Vec<NaiveDateTime> {
        vec![ts(9, 0, 0), ts(9, 0, 1), ts(9, 0, 2)]
    }

    fn kind_of(result: &ValidationResult) -> &SchemaErrorKind {
        &result.error().expect("expected invalid").kind
    }

    #[test]
    fn test_valid_dataset_is_classified() {
        let dataset = Dataset::builder()
            .datetime_index(index3())
            .column("speed", Column::Float(vec![1.0, 2.0, 3.0]))
            .column("temp", Column::Integer(vec![10, 20, 30]))
            .build();

        let schema = validate(&dataset).into_result().unwrap();
        assert_eq!(schema.row_count, 3);
        assert_eq!(schema.columns[0].kind, ColumnKind::Numeric);
        assert_eq!(schema.columns[1].kind, ColumnKind::ConvertibleToNumeric);
        assert_eq!(schema.convertible_columns().count(), 1);
    }

    #[test]
    fn test_text_index_is_rejected() {
        let dataset = Dataset::builder()
            .index(Index::Text(vec!["a".to_string()]))
            .column("speed", Column::Float(vec![1.0]))
            .build();

        let result = validate(&dataset);
        assert!(!result.is_valid());
        assert_eq!(
            kind_of(&result),
            &SchemaErrorKind::NonDateTimeIndex {
                found: "text".to_string()
            }
        );
    }

    #[test]
    fn test_index_checked_before_emptiness() {
        let dataset = Dataset::builder().index(Index::Integer(vec![])).build();
        assert!(matches!(
            kind_of(&validate(&dataset)),
            SchemaErrorKind::NonDateTimeIndex { .. }
        ));
    }

    #[test]
    fn test_no_columns_is_empty() {
        let dataset = Dataset::builder().datetime_index(index3()).build();
        assert_eq!(kind_of(&validate(&dataset)), &SchemaErrorKind::EmptyDataset);
    }

    #[test]
    fn test_no_rows_is_empty() {
        let dataset = Dataset::builder()
            .datetime_index(vec![])
            .column("speed", Column::Float(vec![]))
            .build();
        assert_eq!(kind_of(&validate(&dataset)), &SchemaErrorKind::EmptyDataset);
    }

    #[test]
    fn test_ragged_column() {
        let dataset = Dataset::builder()
            .datetime_index(index3())
            .column("speed", Column::Float(vec![1.0]))
            .build();
        assert_eq!(
            kind_of(&validate(&dataset)),
            &SchemaErrorKind::RaggedColumn {
                column: "speed".to_string(),
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_blank_label() {
        let dataset = Dataset::builder()
            .datetime_index(index3())
            .column("speed", Column::Float(vec![1.0, 2.0, 3.0]))
            .column("  ", Column::Float(vec![1.0, 2.0, 3.0]))
            .build();
        assert_eq!(
            kind_of(&validate(&dataset)),
            &SchemaErrorKind::BlankColumnLabel { position: 1 }
        );
    }

    #[test]
    fn test_all_unconvertible_columns_reported() {
        let dataset = Dataset::builder()
            .datetime_index(index3())
            .column("status", Column::text(&["OK", "OK", "FAIL"]))
            .column("speed", Column::Float(vec![1.0, 2.0, 3.0]))
            .column("seen", Column::DateTime(index3()))
            .build();

        let err = validate(&dataset).into_result().unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].column, "status");
        assert_eq!(violations[0].position, 0);
        assert_eq!(violations[1].column, "seen");
        assert_eq!(violations[1].position, 2);
    }
}
