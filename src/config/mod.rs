//! Configuration management for SessionFrame.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! SessionFrame uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SESSIONFRAME_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Range validation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sessionframe::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sessionframe.toml")?;
//!
//! println!("Batch size: {}", config.export.batch_size);
//! println!("Sink: {}", config.sink.target);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`ExportConfig`] - Batch size, retries, session identifier, channel group
//! - [`SinkConfig`] - Recording store selection
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! batch_size = 5000
//! max_retries = 3
//! retry_delay_ms = 100
//! application_group = "SessionFrame"
//!
//! [sink]
//! target = "jsonl"
//! output_dir = "${SESSIONFRAME_OUTPUT}"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config, load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, LoggingConfig, SessionFrameConfig, SinkConfig, SinkTarget,
};
