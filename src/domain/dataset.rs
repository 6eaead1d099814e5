//! In-memory tabular input
//!
//! A [`Dataset`] is one time index plus an ordered list of labelled columns, all of
//! the same length. The pipeline only ever reads it.

use chrono::NaiveDateTime;

/// Row index of a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// Naive date-times, taken in their own representation
    DateTime(Vec<NaiveDateTime>),
    /// Integer positions or ids
    Integer(Vec<i64>),
    /// Free text labels
    Text(Vec<String>),
}

impl Index {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Index::DateTime(v) => v.len(),
            Index::Integer(v) => v.len(),
            Index::Text(v) => v.len(),
        }
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Index::DateTime(_) => "datetime",
            Index::Integer(_) => "integer",
            Index::Text(_) => "text",
        }
    }

    /// Returns the timestamps if this is a date-time index
    pub fn as_datetime(&self) -> Option<&[NaiveDateTime]> {
        match self {
            Index::DateTime(v) => Some(v),
            _ => None,
        }
    }
}

/// One column of raw values
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point, `NaN` marks a missing value
    Float(Vec<f64>),
    /// Integers
    Integer(Vec<i64>),
    /// Booleans
    Boolean(Vec<bool>),
    /// Text, `None` marks a missing value
    Text(Vec<Option<String>>),
    /// Date-times
    DateTime(Vec<NaiveDateTime>),
}

impl Column {
    /// Builds a text column from string slices, blank strings become missing
    pub fn text<S: AsRef<str>>(values: &[S]) -> Self {
        Column::Text(
            values
                .iter()
                .map(|v| {
                    let v = v.as_ref();
                    if v.trim().is_empty() {
                        None
                    } else {
                        Some(v.to_string())
                    }
                })
                .collect(),
        )
    }

    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Boolean(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::DateTime(v) => v.len(),
        }
    }

    /// True if the column holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable type name, used in reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Integer(_) => "integer",
            Column::Boolean(_) => "boolean",
            Column::Text(_) => "text",
            Column::DateTime(_) => "datetime",
        }
    }
}

/// Time-indexed table of labelled columns
///
/// Labels are kept verbatim and may repeat; uniqueness is enforced later when
/// columns are mapped to channels.
///
/// # Examples
///
/// ```
/// use sessionframe::domain::dataset::{Column, Dataset};
/// use chrono::NaiveDate;
///
/// let t0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let dataset = Dataset::builder()
///     .datetime_index(vec![t0])
///     .column("speed", Column::Float(vec![1.0]))
///     .build();
///
/// assert_eq!(dataset.row_count(), 1);
/// assert_eq!(dataset.column_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    index: Index,
    columns: Vec<(String, Column)>,
}

impl Dataset {
    /// Creates a dataset from an index and columns
    pub fn new(index: Index, columns: Vec<(String, Column)>) -> Self {
        Self { index, columns }
    }

    /// Starts a builder
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Row index
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Columns in order
    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// First column with the given label
    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, column)| column)
    }

    /// Column labels in order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.index.len()
    }
}

/// Builder for [`Dataset`]
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    index: Option<Index>,
    columns: Vec<(String, Column)>,
}

impl DatasetBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the index
    pub fn index(mut self, index: Index) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets a date-time index
    pub fn datetime_index(self, timestamps: Vec<NaiveDateTime>) -> Self {
        self.index(Index::DateTime(timestamps))
    }

    /// Appends a column
    pub fn column(mut self, label: impl Into<String>, column: Column) -> Self {
        self.columns.push((label.into(), column));
        self
    }

    /// Builds the dataset, defaulting to an empty date-time index
    pub fn build(self) -> Dataset {
        Dataset::new(
            self.index.unwrap_or_else(|| Index::DateTime(Vec::new())),
            self.columns,
        )
    }
}
