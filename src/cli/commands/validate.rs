//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the SessionFrame configuration file.

use crate::config::{load_config, SinkTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Validate configuration
        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!("  Dry Run: {}", config.application.dry_run);
                println!("  Sink: {}", config.sink.target);
                if config.sink.target == SinkTarget::Jsonl {
                    println!("  Output Directory: {}", config.sink.output_dir);
                }
                println!("  Batch Size: {}", config.export.batch_size);
                println!(
                    "  Retries: {} x {}ms",
                    config.export.max_retries, config.export.retry_delay_ms
                );
                println!("  Application Group: {}", config.export.application_group);
                println!(
                    "  Session Identifier: {}",
                    config
                        .export
                        .session_identifier
                        .as_deref()
                        .unwrap_or("<derived from time origin>")
                );
                if config.logging.local_enabled {
                    println!(
                        "  File Logging: {} ({})",
                        config.logging.local_path, config.logging.local_rotation
                    );
                }
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}
