//! Domain error types
//!
//! This module defines the error hierarchy for SessionFrame. Each pipeline stage
//! has its own error type so that callers can tell exactly where an export stopped;
//! [`PipelineError`] unifies them for the orchestrator and [`SessionFrameError`]
//! covers everything outside the pipeline (configuration, input files, I/O).

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Main SessionFrame error type
///
/// This is the error type used by configuration loading, input ingestion and the
/// CLI-facing helpers.
#[derive(Debug, Error)]
pub enum SessionFrameError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input dataset could not be read or parsed
    #[error("Input error: {0}")]
    Input(String),

    /// Export pipeline errors
    #[error("Export error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Sink errors outside a running export
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// A column that the schema validator refused, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnViolation {
    /// Position of the column in the dataset
    pub position: usize,

    /// Column label
    pub column: String,

    /// Why the column cannot be exported
    pub reason: String,
}

impl ColumnViolation {
    /// Creates a new violation record
    pub fn new(position: usize, column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            position,
            column: column.into(),
            reason: reason.into(),
        }
    }
}

fn format_violations(violations: &[ColumnViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("'{}' ({})", v.column, v.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural defects of the input dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    /// The index is not a date-time sequence
    #[error("index is of type {found}, expected a date-time index")]
    NonDateTimeIndex { found: String },

    /// No columns, or no rows
    #[error("dataset has no columns or no rows")]
    EmptyDataset,

    /// A column is not aligned with the index
    #[error("column '{column}' has {actual} values but the index has {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A column label is empty or whitespace
    #[error("column at position {position} has a blank label")]
    BlankColumnLabel { position: usize },

    /// One or more columns are neither floating point nor convertible to it
    #[error(
        "{} column(s) cannot be converted to floating point: {}",
        .violations.len(),
        format_violations(.violations)
    )]
    NonNumericColumns { violations: Vec<ColumnViolation> },
}

/// Schema validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema error: {kind}")]
pub struct SchemaError {
    /// What is wrong with the dataset
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    /// Creates a schema error of the given kind
    pub fn new(kind: SchemaErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the violations if this is a non-numeric column error
    pub fn violations(&self) -> &[ColumnViolation] {
        match &self.kind {
            SchemaErrorKind::NonNumericColumns { violations } => violations,
            _ => &[],
        }
    }
}

impl From<SchemaErrorKind> for SchemaError {
    fn from(kind: SchemaErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A column whose every value failed to convert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Coercion error: column '{column}' (position {position}) could not be converted: {reason}")]
pub struct CoercionError {
    /// Column label
    pub column: String,

    /// Column position
    pub position: usize,

    /// Failure reason from the coercion report
    pub reason: String,
}

/// The dataset cannot be bound to a single-day session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionSpanError {
    /// A timestamp falls on a different calendar day than the time origin
    #[error(
        "dataset spans more than one day: row {offending_index} falls on {offending_day}, session day is {session_day}"
    )]
    MultiDayDataset {
        offending_index: usize,
        session_day: NaiveDate,
        offending_day: NaiveDate,
    },

    /// A timestamp precedes the row before it
    #[error("index is not sorted: row {offending_index} ({timestamp}) precedes the previous row")]
    UnsortedIndex {
        offending_index: usize,
        timestamp: NaiveDateTime,
    },

    /// There is no timestamp to take the origin from
    #[error("index is empty, no time origin can be derived")]
    EmptyIndex,
}

/// Two columns map to the same channel name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Name collision: columns at positions {first_position} and {second_position} both map to channel '{name}'"
)]
pub struct NameCollisionError {
    /// The contested channel name
    pub name: String,

    /// Position of the first column using the name
    pub first_position: usize,

    /// Position of the second column using the name
    pub second_position: usize,
}

/// Errors raised by a session sink
///
/// Sink implementations translate their own failures into these variants so that
/// the pipeline never sees third-party error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The store could not be reached or initialised
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The session handle is not known to the store
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The channel handle is not known to the store
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// I/O failure inside the store
    #[error("store I/O failure: {0}")]
    Io(String),

    /// Encoding failure inside the store
    #[error("store serialization failure: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err.to_string())
    }
}

/// A batch write that kept failing after all retries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Write error: channel '{channel}' batch {batch_index} failed after {attempts} attempt(s): {cause}"
)]
pub struct WriteError {
    /// Channel being written
    pub channel: String,

    /// Zero-based batch index within the channel
    pub batch_index: usize,

    /// Number of attempts made
    pub attempts: usize,

    /// Last error returned by the sink
    #[source]
    pub cause: SinkError,
}

/// Sink operation that failed outside of batch writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOperation {
    CreateSession,
    CreateChannel,
    CloseSession,
}

impl std::fmt::Display for SinkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SinkOperation::CreateSession => "create_session",
            SinkOperation::CreateChannel => "create_channel",
            SinkOperation::CloseSession => "close_session",
        };
        f.write_str(name)
    }
}

/// Any error that terminates an export
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Structural input defect
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A column wholly unconvertible
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// Multi-day or unsorted index
    #[error("Session span error: {0}")]
    SessionSpan(#[from] SessionSpanError),

    /// Duplicate channel name
    #[error(transparent)]
    NameCollision(#[from] NameCollisionError),

    /// Batch write failure after retries
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Session or channel management failure
    #[error("Sink error during {operation}: {source}")]
    Sink {
        operation: SinkOperation,
        #[source]
        source: SinkError,
    },

    /// Caller requested cancellation between batches
    #[error("Export cancelled after {batches_written} batch(es)")]
    Cancelled { batches_written: usize },

    /// Export options out of range
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),
}

impl PipelineError {
    /// Wraps a sink error raised by a session/channel management call
    pub fn sink(operation: SinkOperation, source: SinkError) -> Self {
        Self::Sink { operation, source }
    }

    /// Returns true if the error is a cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SessionFrameError {
    fn from(err: std::io::Error) -> Self {
        SessionFrameError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SessionFrameError {
    fn from(err: serde_json::Error) -> Self {
        SessionFrameError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SessionFrameError {
    fn from(err: toml::de::Error) -> Self {
        SessionFrameError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for SessionFrameError {
    fn from(err: csv::Error) -> Self {
        SessionFrameError::Input(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_frame_error_display() {
        let err = SessionFrameError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new(SchemaErrorKind::NonDateTimeIndex {
            found: "integer".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Schema error: index is of type integer, expected a date-time index"
        );
    }

    #[test]
    fn test_schema_error_lists_violations() {
        let err = SchemaError::new(SchemaErrorKind::NonNumericColumns {
            violations: vec![
                ColumnViolation::new(0, "status", "no decimal values"),
                ColumnViolation::new(2, "when", "date-time values"),
            ],
        });
        let msg = err.to_string();
        assert!(msg.contains("2 column(s)"));
        assert!(msg.contains("'status' (no decimal values)"));
        assert!(msg.contains("'when' (date-time values)"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_violations_empty_for_other_kinds() {
        let err = SchemaError::new(SchemaErrorKind::EmptyDataset);
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_pipeline_error_conversion() {
        let span = SessionSpanError::EmptyIndex;
        let err: PipelineError = span.into();
        assert!(matches!(err, PipelineError::SessionSpan(_)));

        let sink_err: SessionFrameError = SinkError::Rejected("full".to_string()).into();
        assert!(matches!(sink_err, SessionFrameError::Sink(_)));
    }

    #[test]
    fn test_write_error_keeps_cause() {
        use std::error::Error as _;

        let err = WriteError {
            channel: "speed".to_string(),
            batch_index: 2,
            attempts: 4,
            cause: SinkError::Io("disk full".to_string()),
        };
        assert!(err.to_string().contains("channel 'speed' batch 2"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_sink_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SinkError = io_err.into();
        assert!(matches!(err, SinkError::Io(_)));
    }

    #[test]
    fn test_sink_operation_display() {
        let err = PipelineError::sink(
            SinkOperation::CreateChannel,
            SinkError::Rejected("limit".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Sink error during create_channel: request rejected: limit"
        );
        assert!(!err.is_cancelled());
        assert!(PipelineError::Cancelled { batches_written: 1 }.is_cancelled());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SessionFrameError = toml_err.into();
        assert!(matches!(err, SessionFrameError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &SessionFrameError::Input("x".to_string());
        let _: &dyn std::error::Error = &SessionSpanError::EmptyIndex;
        let _: &dyn std::error::Error = &PipelineError::Cancelled { batches_written: 0 };
    }
}
