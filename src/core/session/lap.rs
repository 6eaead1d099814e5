//! Session start lap
//!
//! A session is marked with the lap it starts in. The number comes from a `Lap`
//! column at the origin row when the dataset carries one.

use crate::core::transform::CoercedDataset;
use crate::domain::session::DEFAULT_START_LAP;

/// Column label that carries lap numbers
pub const LAP_COLUMN: &str = "Lap";

/// Lap number at the time origin
///
/// Reads the first column labelled [`LAP_COLUMN`] at row 0. Fractional values are
/// truncated. A missing column, a missing value or a value outside `u32` gives
/// [`DEFAULT_START_LAP`]. The column itself is still exported as a channel.
pub fn start_lap(data: &CoercedDataset) -> u32 {
    let Some(column) = data.columns().iter().find(|c| c.label == LAP_COLUMN) else {
        return DEFAULT_START_LAP;
    };

    match column.values.first().copied() {
        Some(value) if value.is_finite() && (0.0..=u32::MAX as f64).contains(&value.trunc()) => {
            value.trunc() as u32
        }
        other => {
            tracing::debug!(
                value = ?other,
                default = DEFAULT_START_LAP,
                "Lap column has no usable value at the origin, using default start lap"
            );
            DEFAULT_START_LAP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::CoercedColumn;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn data(columns: Vec<(&str, Vec<f64>)>) -> CoercedDataset {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(1);
        let timestamps = (0..rows as i64)
            .map(|i| start + chrono::Duration::seconds(i))
            .collect();
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(position, (label, values))| CoercedColumn {
                position,
                label: label.to_string(),
                values,
            })
            .collect();
        CoercedDataset::new(timestamps, columns)
    }

    #[test]
    fn test_no_lap_column_uses_default() {
        let data = data(vec![("speed", vec![1.0, 2.0])]);
        assert_eq!(start_lap(&data), DEFAULT_START_LAP);
    }

    #[test]
    fn test_lap_read_at_origin_row() {
        let data = data(vec![("speed", vec![1.0, 2.0]), ("Lap", vec![3.0, 4.0])]);
        assert_eq!(start_lap(&data), 3);
    }

    #[test_case(f64::NAN ; "missing")]
    #[test_case(-1.0 ; "negative")]
    #[test_case(f64::INFINITY ; "infinite")]
    #[test_case(1e12 ; "too large")]
    fn test_unusable_origin_value_uses_default(value: f64) {
        let data = data(vec![("Lap", vec![value, 5.0])]);
        assert_eq!(start_lap(&data), DEFAULT_START_LAP);
    }

    #[test]
    fn test_fractional_lap_is_truncated() {
        let data = data(vec![("Lap", vec![2.75])]);
        assert_eq!(start_lap(&data), 2);
    }

    #[test]
    fn test_lap_label_is_case_sensitive() {
        let data = data(vec![("lap", vec![7.0])]);
        assert_eq!(start_lap(&data), DEFAULT_START_LAP);
    }
}
