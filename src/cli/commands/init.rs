//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sessionframe.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing SessionFrame configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: sessionframe validate-config");
                println!("  3. Check a dataset: sessionframe check data.csv");
                println!("  4. Run export: sessionframe export data.csv");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(2)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# SessionFrame Configuration File

[application]
log_level = "info"
dry_run = false

[export]
batch_size = 5000
max_retries = 3
retry_delay_ms = 100
application_group = "SessionFrame"

[sink]
target = "jsonl"
output_dir = "./sessions"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# SessionFrame Configuration File
#
# Every key below shows its default. Values may reference environment
# variables with ${VAR_NAME}, and any key can be overridden with
# SESSIONFRAME_<SECTION>_<KEY>, e.g. SESSIONFRAME_EXPORT_BATCH_SIZE=3000.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode: run the whole export against a counting in-memory sink
dry_run = false

# ============================================================================
# Export Settings
# ============================================================================
[export]
# Samples per batch (1-100000)
batch_size = 5000

# Retries per batch after the first attempt (0-10)
max_retries = 3

# Fixed delay between attempts in milliseconds (0-60000)
retry_delay_ms = 100

# Session identifier; derived from the time origin when unset
# session_identifier = "Run 12"

# Application group every channel belongs to
application_group = "SessionFrame"

# ============================================================================
# Sink Settings
# ============================================================================
[sink]
# Recording store (jsonl | memory)
target = "jsonl"

# Root directory of the JSON-lines sink, one subdirectory per session
output_dir = "./sessions"
# output_dir = "${SESSIONFRAME_OUTPUT}"

# ============================================================================
# Logging Settings
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false

# Directory of the log files
local_path = "./logs"

# Rotation (daily | hourly | never)
local_rotation = "daily"
"#
        .to_string()
    }
}
