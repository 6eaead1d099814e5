//! CSV dataset ingestion
//!
//! The first column is the index, every other column becomes a dataset column.
//! Types are inferred per column from the non-blank cells; labels are kept as they
//! appear in the header, so duplicates and blanks reach the validator untouched.

use crate::core::validation::parse_decimal;
use crate::domain::dataset::{Column, Dataset, Index};
use crate::domain::{Result, SessionFrameError};
use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date-time cell
///
/// Values with a UTC offset keep their local wall-clock time.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Read a dataset from a CSV file
///
/// # Errors
///
/// Returns an input error if the file cannot be opened, has no header, or a row
/// has more fields than the header.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SessionFrameError::Input(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let dataset = read_dataset_from_reader(file)?;

    tracing::info!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        index = dataset.index().type_name(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Read a dataset from any CSV source
///
/// # Errors
///
/// Returns an input error for a missing header or an over-long row.
pub fn read_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    if headers.is_empty() {
        return Err(SessionFrameError::Input("CSV has no header row".to_string()));
    }

    let width = headers.len();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); width];

    for (row, record) in csv.records().enumerate() {
        let record: StringRecord = record?;
        if record.len() > width {
            return Err(SessionFrameError::Input(format!(
                "row {} has {} fields, header has {}",
                row + 1,
                record.len(),
                width
            )));
        }
        for (i, column) in cells.iter_mut().enumerate() {
            // Short rows are padded with missing values
            column.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let mut cells = cells.into_iter();
    let index = infer_index(cells.next().unwrap_or_default());
    let columns = headers
        .iter()
        .skip(1)
        .zip(cells)
        .map(|(label, values)| (label.to_string(), infer_column(&values)))
        .collect();

    Ok(Dataset::new(index, columns))
}

fn infer_index(values: Vec<String>) -> Index {
    if let Some(timestamps) = values
        .iter()
        .map(|v| parse_datetime(v))
        .collect::<Option<Vec<_>>>()
    {
        return Index::DateTime(timestamps);
    }
    if let Some(ids) = values
        .iter()
        .map(|v| v.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Index::Integer(ids);
    }
    Index::Text(values)
}

fn infer_column(values: &[String]) -> Column {
    let present: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    let complete = present.len() == values.len();

    if present.is_empty() {
        return Column::Float(vec![f64::NAN; values.len()]);
    }

    if complete {
        if let Some(ints) = present
            .iter()
            .map(|v| v.parse::<i64>().ok())
            .collect::<Option<Vec<_>>>()
        {
            return Column::Integer(ints);
        }
        if let Some(flags) = present
            .iter()
            .map(|v| parse_bool(v))
            .collect::<Option<Vec<_>>>()
        {
            return Column::Boolean(flags);
        }
        if let Some(timestamps) = present
            .iter()
            .map(|v| parse_datetime(v))
            .collect::<Option<Vec<_>>>()
        {
            return Column::DateTime(timestamps);
        }
    }

    if present.iter().all(|v| parse_decimal(v).is_some()) {
        return Column::Float(
            values
                .iter()
                .map(|v| parse_decimal(v).unwrap_or(f64::NAN))
                .collect(),
        );
    }

    Column::text(values)
}
