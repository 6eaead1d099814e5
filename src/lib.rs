// SessionFrame - Time-indexed tables into recording sessions
// Copyright (c) 2025 SessionFrame Contributors
// Licensed under the MIT License

//! # SessionFrame - time-indexed tables into recording sessions
//!
//! SessionFrame republishes a tabular, time-indexed dataset (one time axis, many
//! numeric columns) into a time-series recording store as one session holding one
//! channel per column.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** that a dataset maps unambiguously onto the session model
//! - **Coercing** integer, boolean and decimal-text columns to floating point
//! - **Binding** the session to the first timestamp and a single calendar day
//! - **Writing** channels in bounded batches, with retries and progress events
//!
//! ## Architecture
//!
//! SessionFrame follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The export pipeline (validation, transform, session, export)
//! - [`adapters`] - CSV ingestion and session sinks (JSON lines, memory)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sessionframe::adapters::csv::read_dataset;
//! use sessionframe::adapters::jsonl::JsonlSink;
//! use sessionframe::core::export::{ExportCoordinator, ExportOptions, TracingProgress};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = read_dataset("run.csv")?;
//!     let sink = Arc::new(JsonlSink::new("./sessions")?);
//!
//!     let coordinator = ExportCoordinator::new(sink, ExportOptions::default());
//!     let outcome = coordinator.execute_export(&dataset, &TracingProgress).await?;
//!
//!     println!("Exported {} samples", outcome.write_report.total_samples);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! Every export ends in exactly one [`core::export::ExportOutcome`] or one
//! [`core::export::ExportFailure`] tagged with the last stage reached. Nothing is
//! sent to the sink until validation, coercion, binding and mapping have all
//! succeeded. A failure while writing leaves a partial session, which is reported
//! and closed, never rolled back:
//!
//! ```rust
//! use sessionframe::adapters::memory::MemorySink;
//! use sessionframe::core::export::{export, ExportStage, NoopProgress};
//! use sessionframe::domain::{Column, Dataset, PipelineError};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let dataset = Dataset::builder()
//!     .datetime_index(vec![day(1), day(2)])
//!     .column("speed", Column::Float(vec![1.0, 2.0]))
//!     .build();
//!
//! let sink = Arc::new(MemorySink::new());
//! let failure = export(&dataset, sink.clone(), 5000, &NoopProgress).await.unwrap_err();
//!
//! assert_eq!(failure.stage, ExportStage::Coerced);
//! assert!(matches!(failure.error, PipelineError::SessionSpan(_)));
//! assert_eq!(sink.calls().create_session, 0);
//! # }
//! ```
//!
//! ## Logging
//!
//! SessionFrame uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting export");
//! warn!(channel = "speed", "Column has no values, channel will be empty");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
