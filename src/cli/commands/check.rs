//! Check command implementation
//!
//! This module implements the `check` command: validation, coercion, session
//! binding and channel mapping on a CSV dataset, with no sink involved.

use crate::adapters::csv::read_dataset;
use crate::cli::commands::export::{EXIT_CONFIG_ERROR, EXIT_FAILED_BEFORE_WRITE};
use crate::cli::commands::load_or_default;
use crate::core::export::{plan_export, ExportFailure, ExportPlan, ExportStage};
use crate::core::transform::{CoercionOutcome, CoercionReport};
use crate::domain::session::{ChannelSpec, SessionOrigin};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// CSV file to check, first column is the time index
    pub input: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable check result
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// True when an export would reach the sink
    pub exportable: bool,

    /// Stage reached
    pub stage: ExportStage,

    /// Failure message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Session time origin and day, once bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<SessionOrigin>,

    /// Lap the session would start in, once bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_lap: Option<u32>,

    /// Channels that would be created
    pub channels: Vec<ChannelSpec>,

    /// Coercion outcomes, once coercion ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coercion_report: Option<CoercionReport>,
}

impl CheckReport {
    fn from_plan(plan: ExportPlan) -> Self {
        Self {
            exportable: true,
            stage: ExportStage::Mapped,
            error: None,
            origin: Some(plan.origin),
            start_lap: Some(plan.start_lap),
            channels: plan.channels,
            coercion_report: Some(plan.coercion_report),
        }
    }

    fn from_failure(failure: ExportFailure) -> Self {
        Self {
            exportable: false,
            stage: failure.stage,
            error: Some(failure.error.to_string()),
            origin: None,
            start_lap: None,
            channels: Vec::new(),
            coercion_report: failure.coercion_report,
        }
    }
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Checking dataset");

        let config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let dataset = match read_dataset(&self.input) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let report = match plan_export(&dataset, &config.export.application_group) {
            Ok(plan) => CheckReport::from_plan(plan),
            Err(failure) => CheckReport::from_failure(failure),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(if report.exportable {
            0
        } else {
            EXIT_FAILED_BEFORE_WRITE
        })
    }
}

fn print_report(report: &CheckReport) {
    println!("🔍 Dataset check");
    println!();

    if let Some(coercion) = &report.coercion_report {
        println!("Columns:");
        for entry in &coercion.columns {
            let detail = match &entry.outcome {
                CoercionOutcome::Unchanged => "unchanged".to_string(),
                CoercionOutcome::Coerced { from, invalid_rows } if invalid_rows.is_empty() => {
                    format!("coerced from {from}")
                }
                CoercionOutcome::Coerced { from, invalid_rows } => format!(
                    "coerced from {from}, {} value(s) left missing",
                    invalid_rows.len()
                ),
                CoercionOutcome::Failed { reason } => format!("failed: {reason}"),
            };
            println!("  [{}] {}: {}", entry.position, entry.column, detail);
        }
        println!();
    }

    match (&report.origin, &report.error) {
        (Some(origin), None) => {
            println!("✅ Dataset can be exported");
            println!("  Day: {}", origin.day);
            println!("  Time origin: {}", origin.time_origin);
            if let Some(lap) = report.start_lap {
                println!("  Start lap: Lap {lap}");
            }
            println!("  Channels: {}", report.channels.len());
        }
        (_, Some(error)) => {
            println!("❌ Dataset cannot be exported (stage: {})", report.stage);
            println!("   Error: {error}");
        }
        (None, None) => {}
    }
}
