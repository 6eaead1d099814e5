//! Value coercion
//!
//! This module converts validated columns into the single channel value type,
//! floating point. It is the only place raw column values are read after
//! validation.

pub mod coerce;
pub mod coerced;
pub mod report;

pub use coerce::{coerce, coerce_column};
pub use coerced::{CoercedColumn, CoercedDataset};
pub use report::{CoercionOutcome, CoercionReport, ColumnCoercion};
