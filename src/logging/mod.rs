//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output at a configurable level
//! - JSON-formatted local file logs with rotation
//! - Helper macros that keep field names consistent across the export pipeline
//!
//! # Example
//!
//! ```no_run
//! use sessionframe::logging::init_logging;
//! use sessionframe::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export operation
///
/// # Example
///
/// ```no_run
/// use sessionframe::log_export_start;
///
/// log_export_start!("Run 12", 4, 10_000);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($identifier:expr, $columns:expr, $rows:expr) => {
        tracing::info!(
            session = %$identifier,
            columns = $columns,
            rows = $rows,
            "Starting export"
        );
    };
}

/// Log the completion of an export operation
///
/// # Example
///
/// ```no_run
/// use sessionframe::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(2, 20_000, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($channels:expr, $samples:expr, $duration:expr) => {
        tracing::info!(
            channels = $channels,
            samples = $samples,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sessionframe::log_error_with_context;
/// use sessionframe::domain::SessionFrameError;
///
/// let error = SessionFrameError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log one written batch
///
/// # Example
///
/// ```no_run
/// use sessionframe::log_batch_processing;
///
/// log_batch_processing!("speed", 1, 4);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($channel:expr, $current:expr, $total:expr) => {
        tracing::debug!(
            channel = %$channel,
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Batch written"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use sessionframe::log_retry_attempt;
///
/// log_retry_attempt!(2, 4, "store unavailable");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::SessionFrameError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let error = SessionFrameError::Input("missing column".to_string());
        log_export_start!("Run 1", 2usize, 3usize);
        log_export_complete!(2usize, 6usize, Duration::from_millis(5));
        log_error_with_context!(&error, "Reading input");
        log_batch_processing!("speed", 1usize, 2usize);
        log_retry_attempt!(1usize, 4usize, "store unavailable");
    }
}
