//! Column classification
//!
//! Every column is classified exactly once into a closed set of kinds. Downstream
//! stages act on the recorded kind and never inspect the raw values again to decide
//! convertibility.

use crate::domain::dataset::Column;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a column relates to the floating-point channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Already floating point
    Numeric,
    /// Integers, booleans or decimal-like text
    ConvertibleToNumeric,
    /// Cannot be represented as floating point
    Unconvertible,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::ConvertibleToNumeric => "convertible",
            ColumnKind::Unconvertible => "unconvertible",
        };
        f.write_str(name)
    }
}

/// Parses decimal-like text into a finite float
///
/// Surrounding whitespace is ignored. `inf` and `NaN` spellings are rejected since
/// they would pass for values the store cannot hold.
///
/// # Examples
///
/// ```
/// use sessionframe::core::validation::parse_decimal;
///
/// assert_eq!(parse_decimal(" 2.5 "), Some(2.5));
/// assert_eq!(parse_decimal("1e3"), Some(1000.0));
/// assert_eq!(parse_decimal("OK"), None);
/// assert_eq!(parse_decimal("NaN"), None);
/// ```
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classifies a column, returning the reason when it is unconvertible
pub fn classify_column(column: &Column) -> (ColumnKind, Option<String>) {
    match column {
        Column::Float(_) => (ColumnKind::Numeric, None),
        Column::Integer(_) | Column::Boolean(_) => (ColumnKind::ConvertibleToNumeric, None),
        Column::DateTime(_) => (
            ColumnKind::Unconvertible,
            Some("date-time values".to_string()),
        ),
        Column::Text(values) => classify_text(values),
    }
}

fn classify_text(values: &[Option<String>]) -> (ColumnKind, Option<String>) {
    let mut present = values
        .iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .peekable();

    // All blank: nothing to reject, coercion reports it instead
    if present.peek().is_none() {
        return (ColumnKind::ConvertibleToNumeric, None);
    }

    if present.any(|v| parse_decimal(v).is_some()) {
        (ColumnKind::ConvertibleToNumeric, None)
    } else {
        (
            ColumnKind::Unconvertible,
            Some("no decimal values".to_string()),
        )
    }
}
