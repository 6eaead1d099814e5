//! Session sink factory
//!
//! This module creates the session sink selected by configuration.

use crate::adapters::jsonl::JsonlSink;
use crate::adapters::memory::MemorySink;
use crate::adapters::sink::traits::SessionSink;
use crate::config::schema::{SessionFrameConfig, SinkTarget};
use crate::domain::Result;
use std::sync::Arc;

/// Create a session sink based on the configuration
///
/// A dry run always gets a counting-only [`MemorySink`], whatever the target, so
/// nothing leaves the process.
///
/// # Arguments
///
/// * `config` - The SessionFrame configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements SessionSink
///
/// # Errors
///
/// Returns an error if the sink cannot be created
pub fn create_sink(config: &SessionFrameConfig) -> Result<Arc<dyn SessionSink>> {
    if config.application.dry_run {
        tracing::info!(target_sink = %config.sink.target, "Dry run, using counting memory sink");
        return Ok(Arc::new(MemorySink::counting_only()));
    }

    match config.sink.target {
        SinkTarget::Jsonl => {
            tracing::info!(output_dir = %config.sink.output_dir, "Creating JSONL sink");
            Ok(Arc::new(JsonlSink::new(&config.sink.output_dir)?))
        }
        SinkTarget::Memory => {
            tracing::info!("Creating memory sink");
            Ok(Arc::new(MemorySink::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_selects_memory() {
        let mut config = SessionFrameConfig::default();
        config.application.dry_run = true;
        config.sink.target = SinkTarget::Jsonl;

        let sink = create_sink(&config).unwrap();
        assert_eq!(sink.name(), "memory");
    }

    #[test]
    fn test_jsonl_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SessionFrameConfig::default();
        config.sink.output_dir = dir.path().display().to_string();

        let sink = create_sink(&config).unwrap();
        assert_eq!(sink.name(), "jsonl");
    }

    #[test]
    fn test_jsonl_target_rejects_empty_dir() {
        let mut config = SessionFrameConfig::default();
        config.sink.output_dir = String::new();
        assert!(create_sink(&config).is_err());
    }
}
