//! Coerced dataset
//!
//! The floating-point view of a dataset that the rest of the pipeline works on.
//! `NaN` is the missing-value marker.

use crate::domain::dataset::{Column, Dataset, Index};
use chrono::NaiveDateTime;

/// One column after coercion
///
/// Values compare bitwise, so two missing markers are equal.
#[derive(Debug, Clone)]
pub struct CoercedColumn {
    /// Position in the source dataset
    pub position: usize,

    /// Source column label
    pub label: String,

    /// Floating-point values aligned to the index
    pub values: Vec<f64>,
}

impl CoercedColumn {
    /// Number of values that are not missing
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

impl PartialEq for CoercedColumn {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.label == other.label
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Dataset whose columns are all floating point
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedDataset {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<CoercedColumn>,
}

impl CoercedDataset {
    /// Creates a coerced dataset
    pub fn new(timestamps: Vec<NaiveDateTime>, columns: Vec<CoercedColumn>) -> Self {
        Self {
            timestamps,
            columns,
        }
    }

    /// Index timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Columns in dataset order
    pub fn columns(&self) -> &[CoercedColumn] {
        &self.columns
    }

    /// Column at a source position
    pub fn column(&self, position: usize) -> Option<&CoercedColumn> {
        self.columns.iter().find(|c| c.position == position)
    }

    /// `(position, label)` pairs in order
    pub fn labels(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().map(|c| (c.position, c.label.as_str()))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Turns the coerced values back into a dataset of float columns
    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(
            Index::DateTime(self.timestamps.clone()),
            self.columns
                .iter()
                .map(|c| (c.label.clone(), Column::Float(c.values.clone())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: Vec<f64>) -> CoercedColumn {
        CoercedColumn {
            position: 0,
            label: "speed".to_string(),
            values,
        }
    }

    #[test]
    fn test_missing_markers_compare_equal() {
        assert_eq!(column(vec![1.0, f64::NAN]), column(vec![1.0, f64::NAN]));
        assert_ne!(column(vec![1.0, f64::NAN]), column(vec![1.0, 2.0]));
        assert_ne!(column(vec![1.0]), column(vec![1.0, 1.0]));
    }

    #[test]
    fn test_present_count() {
        assert_eq!(column(vec![1.0, f64::NAN, 3.0]).present_count(), 2);
    }

    #[test]
    fn test_to_dataset_keeps_labels_and_index() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let coerced = CoercedDataset::new(vec![ts], vec![column(vec![4.0])]);
        let dataset = coerced.to_dataset();
        assert_eq!(dataset.labels().collect::<Vec<_>>(), vec!["speed"]);
        assert_eq!(dataset.column("speed"), Some(&Column::Float(vec![4.0])));
        assert_eq!(dataset.index().as_datetime(), Some(&[ts][..]));
        assert_eq!(coerced.column(0).map(|c| c.values.len()), Some(1));
        assert!(coerced.column(1).is_none());
    }
}
