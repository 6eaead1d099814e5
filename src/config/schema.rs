//! Configuration schema types
//!
//! This module defines the configuration structure for SessionFrame. Every section
//! and every key has a default, so an empty file is a valid configuration.

use crate::core::export::batch::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use crate::core::session::DEFAULT_APPLICATION_GROUP;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound for `export.max_retries`
pub const MAX_RETRIES_LIMIT: usize = 10;

/// Upper bound for `export.retry_delay_ms`
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Recording store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkTarget {
    /// Directory of JSON-lines files
    #[default]
    Jsonl,
    /// In-memory store, nothing persisted
    Memory,
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkTarget::Jsonl => f.write_str("jsonl"),
            SinkTarget::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for SinkTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(Self::Jsonl),
            "memory" => Ok(Self::Memory),
            _ => Err(format!(
                "Invalid sink target: {s}. Expected 'jsonl' or 'memory'"
            )),
        }
    }
}

/// Main SessionFrame configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFrameConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export pipeline settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Recording store settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionFrameConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.sink.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode, runs the export against an in-memory sink
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Samples per batch written to the sink
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retries per failed batch write
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Fixed delay between retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Session identifier, defaults to the input file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_identifier: Option<String>,

    /// Parent group of every channel
    #[serde(default = "default_application_group")]
    pub application_group: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "export.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            ));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "export.max_retries must be <= {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            ));
        }

        if self.retry_delay_ms > MAX_RETRY_DELAY_MS {
            return Err(format!(
                "export.retry_delay_ms must be <= {MAX_RETRY_DELAY_MS}, got {}",
                self.retry_delay_ms
            ));
        }

        if self.application_group.trim().is_empty() {
            return Err("export.application_group cannot be empty".to_string());
        }

        if matches!(&self.session_identifier, Some(id) if id.trim().is_empty()) {
            return Err("export.session_identifier cannot be empty when set".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            session_identifier: None,
            application_group: default_application_group(),
        }
    }
}

/// Recording store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Store implementation
    #[serde(default)]
    pub target: SinkTarget,

    /// Output directory for the `jsonl` target
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl SinkConfig {
    fn validate(&self) -> Result<(), String> {
        if self.target == SinkTarget::Jsonl && self.output_dir.trim().is_empty() {
            return Err("sink.output_dir is required when sink.target = 'jsonl'".to_string());
        }
        Ok(())
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            target: SinkTarget::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_application_group() -> String {
    DEFAULT_APPLICATION_GROUP.to_string()
}

fn default_output_dir() -> String {
    "./sessions".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
