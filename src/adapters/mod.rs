//! External system integrations for SessionFrame.
//!
//! This module provides adapters on both sides of the export pipeline:
//!
//! - [`csv`] - Dataset ingestion from CSV files
//! - [`sink`] - Session sink abstraction (trait-based) and factory
//! - [`jsonl`] - Sink writing sessions as JSON-lines files
//! - [`memory`] - Sink keeping sessions in memory, for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external stores and enable
//! testing with in-memory implementations. The pipeline only sees
//! [`sink::SessionSink`].
//!
//! ```rust,no_run
//! use sessionframe::adapters::jsonl::JsonlSink;
//! use sessionframe::adapters::sink::SessionSink;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink: Arc<dyn SessionSink> = Arc::new(JsonlSink::new("./sessions")?);
//! assert_eq!(sink.name(), "jsonl");
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod jsonl;
pub mod memory;
pub mod sink;
