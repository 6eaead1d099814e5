//! Schema validation for export input
//!
//! This module decides, before anything is sent to a sink, whether a dataset can be
//! represented as a session: a date-time index and columns that are floating point
//! or convertible to it.

pub mod classify;
pub mod schema;

pub use classify::{classify_column, parse_decimal, ColumnKind};
pub use schema::{validate, ClassifiedColumn, ValidatedSchema, ValidationResult};
