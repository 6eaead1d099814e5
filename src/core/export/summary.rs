//! Export summary and reporting
//!
//! This module defines the terminal outcomes of an export: an [`ExportOutcome`] on
//! success, an [`ExportFailure`] otherwise. Exactly one is produced per export.

use crate::core::export::stage::ExportStage;
use crate::core::transform::CoercionReport;
use crate::domain::errors::PipelineError;
use crate::domain::ids::SessionKey;
use crate::domain::session::{ChannelSpec, SessionHandle, SessionOrigin};
use std::fmt;
use std::time::{Duration, Instant};

/// Write statistics of one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelWriteStats {
    /// Source column position
    pub position: usize,

    /// Channel name
    pub name: String,

    /// Samples written
    pub samples_written: usize,

    /// Batches written
    pub batches_written: usize,

    /// Batches planned for the channel
    pub total_batches: usize,

    /// Write attempts beyond the first, summed over batches
    pub retries: usize,
}

impl ChannelWriteStats {
    /// Create empty stats for a channel
    pub fn new(spec: &ChannelSpec, total_batches: usize) -> Self {
        Self {
            position: spec.position,
            name: spec.name.to_string(),
            samples_written: 0,
            batches_written: 0,
            total_batches,
            retries: 0,
        }
    }

    /// Record one written batch
    pub fn record_batch(&mut self, samples: usize, attempts: usize) {
        self.samples_written += samples;
        self.batches_written += 1;
        self.retries += attempts.saturating_sub(1);
    }

    /// True when every planned batch was written
    pub fn is_complete(&self) -> bool {
        self.batches_written == self.total_batches
    }
}

/// Per-channel write report, for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Channels in write order, the last one possibly incomplete
    pub channels: Vec<ChannelWriteStats>,

    /// Samples written across channels
    pub total_samples: usize,

    /// Batches written across channels
    pub total_batches: usize,

    /// Retries across channels
    pub retries: usize,

    /// Time spent writing
    pub duration: Duration,
}

impl WriteReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, stats: ChannelWriteStats) {
        self.total_samples += stats.samples_written;
        self.total_batches += stats.batches_written;
        self.retries += stats.retries;
        self.channels.push(stats);
    }

    /// Record a fully written channel
    pub fn record_channel(&mut self, stats: ChannelWriteStats) {
        self.push(stats);
    }

    /// Record a channel that was created but not finished
    pub fn record_partial(&mut self, stats: ChannelWriteStats) {
        tracing::warn!(
            channel = %stats.name,
            batches_written = stats.batches_written,
            total_batches = stats.total_batches,
            "Channel left partially written"
        );
        self.push(stats);
    }

    /// Stats of a channel by name
    pub fn channel(&self, name: &str) -> Option<&ChannelWriteStats> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Last channel whose batches were all written
    pub fn last_complete_channel(&self) -> Option<&ChannelWriteStats> {
        self.channels.iter().rev().find(|c| c.is_complete())
    }

    /// Close the report with an error
    pub fn fail(mut self, error: PipelineError, start: Instant) -> WriteFailure {
        self.duration = start.elapsed();
        WriteFailure {
            error,
            report: self,
        }
    }

    /// Close the report as cancelled
    pub fn cancelled(self, start: Instant) -> WriteFailure {
        let batches_written = self.total_batches;
        self.fail(PipelineError::Cancelled { batches_written }, start)
    }
}

/// Batch writer failure with everything written before it
#[derive(Debug)]
pub struct WriteFailure {
    /// Cause
    pub error: PipelineError,

    /// Writes that reached the sink
    pub report: WriteReport,
}

/// A session left in the sink by a failed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSession {
    /// Session key
    pub session: SessionKey,

    /// Last channel written completely, if any
    pub last_complete_channel: Option<String>,

    /// Writes that reached the sink
    pub report: WriteReport,

    /// Whether the session was closed after the failure
    pub closed: bool,
}

/// Successful export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Session written
    pub session: SessionHandle,

    /// Time origin and day of the session
    pub origin: SessionOrigin,

    /// Channels in write order
    pub channels: Vec<ChannelSpec>,

    /// Per-column coercion outcomes
    pub coercion_report: CoercionReport,

    /// Per-channel write statistics
    pub write_report: WriteReport,

    /// Total export time
    pub duration: Duration,
}

impl ExportOutcome {
    /// Log the outcome
    pub fn log_summary(&self) {
        tracing::info!(
            session = %self.session.key,
            identifier = %self.session.identifier,
            day = %self.origin.day,
            channels = self.channels.len(),
            samples = self.write_report.total_samples,
            batches = self.write_report.total_batches,
            retries = self.write_report.retries,
            duration_ms = self.duration.as_millis() as u64,
            "Export summary"
        );
    }
}

/// Failed export, tagged with the last stage reached
#[derive(Debug)]
pub struct ExportFailure {
    /// Last stage reached before the failure
    pub stage: ExportStage,

    /// Cause
    pub error: PipelineError,

    /// Coercion outcomes, present once coercion ran
    pub coercion_report: Option<CoercionReport>,

    /// Session left in the sink, present only for failures while writing
    pub partial: Option<PartialSession>,
}

impl ExportFailure {
    /// Create a failure with no report and no partial session
    pub fn new(stage: ExportStage, error: impl Into<PipelineError>) -> Self {
        Self {
            stage,
            error: error.into(),
            coercion_report: None,
            partial: None,
        }
    }

    /// Attach the coercion report
    pub fn with_coercion_report(mut self, report: CoercionReport) -> Self {
        self.coercion_report = Some(report);
        self
    }

    /// Attach the partial session
    pub fn with_partial(mut self, partial: PartialSession) -> Self {
        self.partial = Some(partial);
        self
    }

    /// True if the export was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.error.is_cancelled()
    }

    /// True if anything reached the sink
    pub fn left_partial_session(&self) -> bool {
        self.partial.is_some()
    }

    /// Log the failure
    pub fn log_summary(&self) {
        match &self.partial {
            Some(partial) => tracing::error!(
                stage = %self.stage,
                error = %self.error,
                session = %partial.session,
                last_complete_channel = partial.last_complete_channel.as_deref().unwrap_or("none"),
                samples_written = partial.report.total_samples,
                "Export failed, partial session left in sink"
            ),
            None => tracing::error!(
                stage = %self.stage,
                error = %self.error,
                "Export failed before any write"
            ),
        }
    }
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "export failed during {}: {}",
            self.stage.pending_step(),
            self.error
        )
    }
}

impl std::error::Error for ExportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
