//! Export command implementation
//!
//! This module implements the `export` command, which reads a CSV dataset and
//! writes it to the configured sink as one session.

use crate::adapters::csv::read_dataset;
use crate::adapters::sink::create_sink;
use crate::cli::commands::load_or_default;
use crate::config::SinkTarget;
use crate::core::export::{
    ExportCoordinator, ExportFailure, ExportOptions, ExportOutcome, TracingProgress,
};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Exit code for a configuration or input error
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for an export that failed before writing
pub const EXIT_FAILED_BEFORE_WRITE: i32 = 3;

/// Exit code for an export that failed while writing
pub const EXIT_PARTIAL_SESSION: i32 = 4;

/// Exit code for a cancelled export (SIGINT convention)
pub const EXIT_CANCELLED: i32 = 130;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// CSV file to export, first column is the time index
    pub input: PathBuf,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - run the full export against a counting in-memory sink
    #[arg(long)]
    pub dry_run: bool,

    /// Override samples per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override session identifier
    #[arg(long)]
    pub identifier: Option<String>,

    /// Override sink target (jsonl or memory)
    #[arg(long)]
    pub sink: Option<SinkTarget>,

    /// Override output directory of the JSON-lines sink
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Starting export command");

        // Load configuration
        let mut config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        // Apply CLI overrides
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.export.batch_size = batch_size;
        }
        if let Some(identifier) = &self.identifier {
            tracing::info!(identifier = %identifier, "Overriding session identifier from CLI");
            config.export.session_identifier = Some(identifier.clone());
        }
        if let Some(target) = self.sink {
            tracing::info!(target_sink = %target, "Overriding sink target from CLI");
            config.sink.target = target;
        }
        if let Some(output_dir) = &self.output_dir {
            tracing::info!(output_dir = %output_dir, "Overriding output directory from CLI");
            config.sink.output_dir = output_dir.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let dataset = match read_dataset(&self.input) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                eprintln!("Failed to read input: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No data will be written");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !config.application.dry_run {
            println!("Export Configuration:");
            println!("  Input: {}", self.input.display());
            println!(
                "  Rows x Columns: {} x {}",
                dataset.row_count(),
                dataset.column_count()
            );
            println!("  Sink: {}", config.sink.target);
            if config.sink.target == SinkTarget::Jsonl {
                println!("  Output: {}", config.sink.output_dir);
            }
            println!("  Batch size: {}", config.export.batch_size);
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let sink = match create_sink(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sink");
                eprintln!("Failed to initialize sink: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        let options = match ExportOptions::from_config(&config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Invalid export options: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let coordinator =
            ExportCoordinator::new(sink, options).with_shutdown_signal(shutdown_signal);

        println!("🚀 Starting export...");
        println!();

        match coordinator.execute_export(&dataset, &TracingProgress).await {
            Ok(outcome) => {
                print_outcome(&outcome);
                println!("✅ Export completed successfully!");
                Ok(0)
            }
            Err(failure) => {
                print_failure(&failure);
                Ok(failure_exit_code(&failure))
            }
        }
    }
}

/// Exit code for a failed export
pub fn failure_exit_code(failure: &ExportFailure) -> i32 {
    if failure.is_cancelled() {
        EXIT_CANCELLED
    } else if failure.left_partial_session() {
        EXIT_PARTIAL_SESSION
    } else {
        EXIT_FAILED_BEFORE_WRITE
    }
}

fn print_outcome(outcome: &ExportOutcome) {
    let report = &outcome.write_report;
    println!();
    println!("📊 Export Summary:");
    println!("  Session: {} ({})", outcome.session.identifier, outcome.session.key);
    println!("  Day: {}", outcome.origin.day);
    println!("  Time origin: {}", outcome.origin.time_origin);
    println!("  Channels: {}", outcome.channels.len());
    println!("  Samples: {}", report.total_samples);
    println!("  Batches: {}", report.total_batches);
    println!("  Retries: {}", report.retries);
    println!("  Duration: {:.2}s", outcome.duration.as_secs_f64());

    let coerced: Vec<&str> = outcome.coercion_report.coerced_columns().collect();
    if !coerced.is_empty() {
        println!("  Coerced columns: {}", coerced.join(", "));
    }
    let invalid = outcome.coercion_report.invalid_value_count();
    if invalid > 0 {
        println!("  ⚠️  Values left missing after coercion: {invalid}");
    }
    println!();
}

fn print_failure(failure: &ExportFailure) {
    println!();
    if failure.is_cancelled() {
        println!("⚠️  Export cancelled during {}.", failure.stage.pending_step());
    } else {
        println!("❌ {failure}");
    }

    if let Some(partial) = &failure.partial {
        println!();
        println!("⚠️  A partial session was left in the sink:");
        println!("  Session: {}", partial.session);
        println!(
            "  Last complete channel: {}",
            partial.last_complete_channel.as_deref().unwrap_or("none")
        );
        println!("  Samples written: {}", partial.report.total_samples);
        println!("  Closed: {}", if partial.closed { "yes" } else { "no" });
    }
    println!();
}
