//! Value coercion to floating point
//!
//! Coercion is total: it never fails. Elements that cannot be converted become
//! missing and are listed in the report; a column where nothing converts is marked
//! failed and left for the caller to escalate.

use super::coerced::{CoercedColumn, CoercedDataset};
use super::report::{CoercionOutcome, CoercionReport};
use crate::core::validation::{parse_decimal, ColumnKind, ValidatedSchema};
use crate::domain::dataset::{Column, Dataset};
use chrono::NaiveDateTime;

/// Converts every validated column to floating point
///
/// The schema must come from validating the same dataset. Output is a pure
/// function of the input, so repeating an export after a failure produces the
/// same values and the same report.
///
/// # Arguments
///
/// * `dataset` - Source dataset
/// * `schema` - Classification produced by [`crate::core::validation::validate`]
///
/// # Returns
///
/// The coerced dataset and one report entry per column.
///
/// # Examples
///
/// ```
/// use sessionframe::core::transform::{coerce, CoercionOutcome};
/// use sessionframe::core::validation::validate;
/// use sessionframe::domain::{Column, Dataset};
/// use chrono::NaiveDate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let t0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let dataset = Dataset::builder()
///     .datetime_index(vec![t0])
///     .column("temp", Column::Integer(vec![10]))
///     .build();
///
/// let schema = validate(&dataset).into_result()?;
/// let (coerced, report) = coerce(&dataset, &schema);
///
/// assert_eq!(coerced.columns()[0].values, vec![10.0]);
/// assert!(matches!(report.outcome("temp"), Some(CoercionOutcome::Coerced { .. })));
/// # Ok(())
/// # }
/// ```
pub fn coerce(dataset: &Dataset, schema: &ValidatedSchema) -> (CoercedDataset, CoercionReport) {
    let timestamps: Vec<NaiveDateTime> = dataset
        .index()
        .as_datetime()
        .map(<[NaiveDateTime]>::to_vec)
        .unwrap_or_default();

    let mut report = CoercionReport::new();
    let mut columns = Vec::with_capacity(schema.columns.len());

    for classified in &schema.columns {
        let (values, outcome) = match dataset.columns().get(classified.position) {
            Some((_, column)) => coerce_column(column, classified.kind),
            None => (
                vec![f64::NAN; timestamps.len()],
                CoercionOutcome::Failed {
                    reason: "column not present in dataset".to_string(),
                },
            ),
        };

        tracing::trace!(column = %classified.label, kind = %classified.kind, "Column coerced");
        report.record(classified.position, classified.label.as_str(), outcome);
        columns.push(CoercedColumn {
            position: classified.position,
            label: classified.label.clone(),
            values,
        });
    }

    (CoercedDataset::new(timestamps, columns), report)
}

/// Converts one column according to its recorded kind
pub fn coerce_column(column: &Column, kind: ColumnKind) -> (Vec<f64>, CoercionOutcome) {
    if kind == ColumnKind::Unconvertible {
        return (
            vec![f64::NAN; column.len()],
            CoercionOutcome::Failed {
                reason: format!("{} values cannot be converted", column.type_name()),
            },
        );
    }

    match column {
        Column::Float(values) => coerce_float(column, values),
        Column::Integer(values) => (
            values.iter().map(|&v| v as f64).collect(),
            coerced_from(column, Vec::new()),
        ),
        Column::Boolean(values) => (
            values.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect(),
            coerced_from(column, Vec::new()),
        ),
        Column::Text(values) => coerce_text(values),
        Column::DateTime(_) => (
            vec![f64::NAN; column.len()],
            CoercionOutcome::Failed {
                reason: "datetime values cannot be converted".to_string(),
            },
        ),
    }
}

fn coerced_from(column: &Column, invalid_rows: Vec<usize>) -> CoercionOutcome {
    CoercionOutcome::Coerced {
        from: column.type_name().to_string(),
        invalid_rows,
    }
}

/// Infinities are values the store cannot hold, so they become missing
fn coerce_float(column: &Column, values: &[f64]) -> (Vec<f64>, CoercionOutcome) {
    let invalid_rows: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_infinite())
        .map(|(row, _)| row)
        .collect();

    if invalid_rows.is_empty() {
        return (values.to_vec(), CoercionOutcome::Unchanged);
    }

    let out: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { v } else { f64::NAN })
        .collect();

    if out.iter().all(|v| v.is_nan()) {
        let reason = format!("none of the {} present values is finite", invalid_rows.len());
        return (out, CoercionOutcome::Failed { reason });
    }

    (out, coerced_from(column, invalid_rows))
}

fn coerce_text(values: &[Option<String>]) -> (Vec<f64>, CoercionOutcome) {
    let mut out = Vec::with_capacity(values.len());
    let mut invalid_rows = Vec::new();
    let mut converted = 0usize;

    for (row, value) in values.iter().enumerate() {
        match value.as_deref().map(str::trim) {
            None | Some("") => out.push(f64::NAN),
            Some(text) => match parse_decimal(text) {
                Some(v) => {
                    converted += 1;
                    out.push(v);
                }
                None => {
                    invalid_rows.push(row);
                    out.push(f64::NAN);
                }
            },
        }
    }

    if converted == 0 {
        let reason = if invalid_rows.is_empty() {
            "all values are missing".to_string()
        } else {
            format!("none of the {} present values is decimal", invalid_rows.len())
        };
        return (out, CoercionOutcome::Failed { reason });
    }

    (
        out,
        CoercionOutcome::Coerced {
            from: "text".to_string(),
            invalid_rows,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate;
    use chrono::NaiveDate;

    fn index(n: usize) -> Vec<NaiveDateTime> {
        let t0 = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| t0 + chrono::Duration::seconds(i as i64))
            .collect()
    }

    fn run(dataset: &Dataset) -> (CoercedDataset, CoercionReport) {
        let schema = validate(dataset).into_result().unwrap();
        coerce(dataset, &schema)
    }

    #[test]
    fn test_float_passes_through() {
        let dataset = Dataset::builder()
            .datetime_index(index(3))
            .column("speed", Column::Float(vec![1.0, f64::NAN, 3.0]))
            .build();

        let (coerced, report) = run(&dataset);
        assert_eq!(report.outcome("speed"), Some(&CoercionOutcome::Unchanged));
        assert_eq!(coerced.columns()[0].present_count(), 2);
    }

    #[test]
    fn test_infinite_floats_become_missing() {
        let dataset = Dataset::builder()
            .datetime_index(index(3))
            .column("speed", Column::Float(vec![f64::INFINITY, 2.0, f64::NEG_INFINITY]))
            .build();

        let (coerced, report) = run(&dataset);
        let values = &coerced.columns()[0].values;
        assert!(values[0].is_nan());
        assert_eq!(values[1], 2.0);
        assert!(values[2].is_nan());
        assert_eq!(
            report.outcome("speed"),
            Some(&CoercionOutcome::Coerced {
                from: "float".to_string(),
                invalid_rows: vec![0, 2]
            })
        );

        let (again, second_report) = run(&coerced.to_dataset());
        assert_eq!(coerced, again);
        assert_eq!(second_report.outcome("speed"), Some(&CoercionOutcome::Unchanged));
    }

    #[test]
    fn test_only_infinite_floats_fail() {
        let (values, outcome) =
            coerce_column(&Column::Float(vec![f64::INFINITY, f64::NAN]), ColumnKind::Numeric);
        assert!(values.iter().all(|v| v.is_nan()));
        assert_eq!(
            outcome,
            CoercionOutcome::Failed {
                reason: "none of the 1 present values is finite".to_string()
            }
        );
    }

    #[test]
    fn test_integer_and_boolean_are_coerced() {
        let dataset = Dataset::builder()
            .datetime_index(index(3))
            .column("temp", Column::Integer(vec![10, 20, 30]))
            .column("on", Column::Boolean(vec![true, false, true]))
            .build();

        let (coerced, report) = run(&dataset);
        assert_eq!(coerced.columns()[0].values, vec![10.0, 20.0, 30.0]);
        assert_eq!(coerced.columns()[1].values, vec![1.0, 0.0, 1.0]);
        assert_eq!(
            report.outcome("temp"),
            Some(&CoercionOutcome::Coerced {
                from: "integer".to_string(),
                invalid_rows: vec![]
            })
        );
        assert_eq!(report.coerced_columns().count(), 2);
    }

    #[test]
    fn test_malformed_text_becomes_missing() {
        let dataset = Dataset::builder()
            .datetime_index(index(4))
            .column("level", Column::text(&["1.5", "oops", "", " 2 "]))
            .build();

        let (coerced, report) = run(&dataset);
        let values = &coerced.columns()[0].values;
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
        assert_eq!(values[3], 2.0);
        assert_eq!(
            report.outcome("level"),
            Some(&CoercionOutcome::Coerced {
                from: "text".to_string(),
                invalid_rows: vec![1]
            })
        );
        assert!(report.first_failure().is_none());
    }

    #[test]
    fn test_all_missing_text_fails() {
        let dataset = Dataset::builder()
            .datetime_index(index(2))
            .column("speed", Column::Float(vec![1.0, 2.0]))
            .column("notes", Column::text(&["", " "]))
            .build();

        let (coerced, report) = run(&dataset);
        let err = report.first_failure().unwrap();
        assert_eq!(err.column, "notes");
        assert_eq!(err.position, 1);
        assert_eq!(err.reason, "all values are missing");
        assert_eq!(coerced.columns().len(), 2);
    }

    #[test]
    fn test_unconvertible_kind_is_failed() {
        let (values, outcome) = coerce_column(&Column::text(&["OK"]), ColumnKind::Unconvertible);
        assert!(values[0].is_nan());
        assert!(matches!(outcome, CoercionOutcome::Failed { .. }));
    }

    #[test]
    fn test_coerce_is_idempotent() {
        let dataset = Dataset::builder()
            .datetime_index(index(4))
            .column("speed", Column::Float(vec![1.0, f64::NAN, 3.0, 4.0]))
            .column("temp", Column::Integer(vec![10, 20, 30, 40]))
            .column("level", Column::text(&["1.5", "bad", "", "7"]))
            .column("on", Column::Boolean(vec![true, false, false, true]))
            .build();

        let (first, _) = run(&dataset);
        let (second, report) = run(&first.to_dataset());

        assert_eq!(first, second);
        assert!(report
            .columns
            .iter()
            .all(|c| c.outcome == CoercionOutcome::Unchanged));
    }

    #[test]
    fn test_coerce_is_deterministic() {
        let dataset = Dataset::builder()
            .datetime_index(index(3))
            .column("level", Column::text(&["x", "2", "y"]))
            .build();

        assert_eq!(run(&dataset), run(&dataset));
    }
}
