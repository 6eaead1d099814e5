//! Core business logic for SessionFrame.
//!
//! This module contains the export pipeline, stage by stage.
//!
//! # Modules
//!
//! - [`validation`] - Schema validation and column classification
//! - [`transform`] - Value coercion to floating point
//! - [`session`] - Session binding and channel mapping
//! - [`export`] - Batch writing and export coordination
//!
//! # Export Workflow
//!
//! 1. **Validate**: Reject non-date-time indexes, empty or ragged datasets, unconvertible columns
//! 2. **Coerce**: Convert every column to `f64`, recording invalid values
//! 3. **Bind**: Take the first timestamp as time origin and require a single day
//! 4. **Map**: Give each column a channel, rejecting name collisions
//! 5. **Write**: Open the session, stream channels batch by batch, close the session
//!
//! # Example
//!
//! ```rust,no_run
//! use sessionframe::adapters::memory::MemorySink;
//! use sessionframe::core::export::{ExportCoordinator, ExportOptions, TracingProgress};
//! use sessionframe::domain::Dataset;
//! use std::sync::Arc;
//!
//! # async fn example(dataset: Dataset) -> Result<(), Box<dyn std::error::Error>> {
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(Arc::new(MemorySink::new()), ExportOptions::default())
//!     .with_shutdown_signal(shutdown_rx);
//!
//! let outcome = coordinator.execute_export(&dataset, &TracingProgress).await?;
//!
//! println!("Channels: {}", outcome.channels.len());
//! println!("Samples: {}", outcome.write_report.total_samples);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod session;
pub mod transform;
pub mod validation;
