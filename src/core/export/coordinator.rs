//! Export coordinator - main orchestrator for the export process
//!
//! This module composes validation, coercion, session binding, channel mapping and
//! batch writing into one single-pass export. Every pure stage completes before the
//! session is opened, so a failure up to and including channel mapping never
//! reaches the sink. Once opened, the session is closed on every exit path.

use crate::adapters::sink::SessionSink;
use crate::config::SessionFrameConfig;
use crate::core::export::batch::{BatchConfig, BatchWriter};
use crate::core::export::progress::ProgressObserver;
use crate::core::export::stage::{ExportStage, StageTracker};
use crate::core::export::summary::{
    ExportFailure, ExportOutcome, PartialSession, WriteFailure, WriteReport,
};
use crate::core::session::{bind, map_channels, start_lap, DEFAULT_APPLICATION_GROUP};
use crate::core::transform::{coerce, CoercedDataset, CoercionReport};
use crate::core::validation::validate;
use crate::domain::dataset::Dataset;
use crate::domain::errors::{PipelineError, SinkError, SinkOperation};
use crate::domain::session::{ChannelSpec, SessionHandle, SessionOrigin, SessionRequest};
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Options of a single export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Session identifier, derived from the time origin when absent
    pub session_identifier: Option<String>,

    /// Application group every channel belongs to
    pub application_group: String,

    /// Batch size and retry policy
    pub batch: BatchConfig,
}

impl ExportOptions {
    /// Build options from the `[export]` configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the batch size is out of range
    pub fn from_config(config: &SessionFrameConfig) -> Result<Self> {
        let export = &config.export;
        Ok(Self {
            session_identifier: export.session_identifier.clone(),
            application_group: export.application_group.clone(),
            batch: BatchConfig::from_config(
                export.batch_size,
                export.max_retries,
                export.retry_delay_ms,
            )?,
        })
    }

    /// Identifier to create the session with
    pub fn identifier_for(&self, origin: &SessionOrigin) -> String {
        self.session_identifier
            .clone()
            .unwrap_or_else(|| format!("Session {}", origin.time_origin.format("%Y-%m-%d %H:%M:%S")))
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            session_identifier: None,
            application_group: DEFAULT_APPLICATION_GROUP.to_string(),
            batch: BatchConfig::default(),
        }
    }
}

/// Closes an open session exactly once
///
/// If the export future is dropped mid-write the close is handed to the runtime,
/// so the session does not stay open in the sink.
struct SessionGuard {
    sink: Arc<dyn SessionSink>,
    handle: Option<SessionHandle>,
}

impl SessionGuard {
    fn new(sink: Arc<dyn SessionSink>, handle: SessionHandle) -> Self {
        Self {
            sink,
            handle: Some(handle),
        }
    }

    async fn close(mut self) -> std::result::Result<(), SinkError> {
        match self.handle.take() {
            Some(handle) => self.sink.close_session(handle).await,
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        tracing::warn!(session = %handle.key, "Export abandoned, closing session in background");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let sink = Arc::clone(&self.sink);
                runtime.spawn(async move {
                    if let Err(e) = sink.close_session(handle).await {
                        tracing::error!(error = %e, "Background session close failed");
                    }
                });
            }
            Err(_) => {
                tracing::error!(session = %handle.key, "No runtime available, session left open");
            }
        }
    }
}

/// Export coordinator
///
/// Holds no state across exports: one coordinator may run any number of exports,
/// concurrently if the sink supports concurrent sessions.
pub struct ExportCoordinator {
    sink: Arc<dyn SessionSink>,
    options: ExportOptions,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(sink: Arc<dyn SessionSink>, options: ExportOptions) -> Self {
        Self {
            sink,
            options,
            shutdown_signal: None,
        }
    }

    /// Cancel cooperatively once the signal turns `true`
    ///
    /// The signal is checked before the session is opened and between batches,
    /// never during a batch write.
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Export options
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }

    fn writer(&self) -> BatchWriter {
        let writer = BatchWriter::new(Arc::clone(&self.sink), self.options.batch.clone());
        match &self.shutdown_signal {
            Some(signal) => writer.with_shutdown_signal(signal.clone()),
            None => writer,
        }
    }

    /// Execute the export
    ///
    /// This is the main entry point for the export process. It:
    /// 1. Validates the dataset schema
    /// 2. Coerces every column to floating point
    /// 3. Binds the session time origin and day
    /// 4. Maps columns to channels
    /// 5. Opens the session and writes all channels batch by batch
    /// 6. Closes the session
    ///
    /// # Errors
    ///
    /// Returns an [`ExportFailure`] tagged with the last stage reached. Failures
    /// before [`ExportStage::Writing`] leave nothing in the sink; failures while
    /// writing report the partial session they leave behind.
    pub async fn execute_export(
        &self,
        dataset: &Dataset,
        progress: &dyn ProgressObserver,
    ) -> std::result::Result<ExportOutcome, ExportFailure> {
        let start = Instant::now();
        let mut tracker = StageTracker::new();

        crate::log_export_start!(
            self.options.session_identifier.as_deref().unwrap_or("<derived>"),
            dataset.column_count(),
            dataset.row_count()
        );

        let ExportPlan {
            data,
            coercion_report,
            origin,
            start_lap,
            channels: specs,
        } = run_pure_stages(dataset, &self.options.application_group, &mut tracker)
            .map_err(|failure| self.fail(failure))?;

        if self.is_shutdown_requested() {
            return Err(self.fail(
                ExportFailure::new(tracker.stage(), PipelineError::Cancelled { batches_written: 0 })
                    .with_coercion_report(coercion_report),
            ));
        }

        let request = SessionRequest::new(self.options.identifier_for(&origin), origin)
            .with_start_lap(start_lap);
        let session = match self.sink.create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                return Err(self.fail(
                    ExportFailure::new(
                        tracker.stage(),
                        PipelineError::sink(SinkOperation::CreateSession, e),
                    )
                    .with_coercion_report(coercion_report),
                ))
            }
        };
        tracker.advance();

        tracing::info!(
            sink = self.sink.name(),
            session = %session.key,
            identifier = %session.identifier,
            day = %origin.day,
            channels = specs.len(),
            "Session opened"
        );

        let guard = SessionGuard::new(Arc::clone(&self.sink), session.clone());
        let written = self
            .writer()
            .write(&session, &origin, &specs, &data, progress)
            .await;
        let closed = guard.close().await;

        match (written, closed) {
            (Ok(write_report), Ok(())) => {
                tracker.advance();
                let outcome = ExportOutcome {
                    session,
                    origin,
                    channels: specs,
                    coercion_report,
                    write_report,
                    duration: start.elapsed(),
                };
                crate::log_export_complete!(
                    outcome.channels.len(),
                    outcome.write_report.total_samples,
                    outcome.duration
                );
                outcome.log_summary();
                Ok(outcome)
            }
            (Ok(write_report), Err(e)) => Err(self.fail(
                ExportFailure::new(
                    tracker.stage(),
                    PipelineError::sink(SinkOperation::CloseSession, e),
                )
                .with_coercion_report(coercion_report)
                .with_partial(partial_session(&session, write_report, false)),
            )),
            (Err(WriteFailure { error, report }), closed) => {
                if let Err(e) = &closed {
                    tracing::error!(session = %session.key, error = %e, "Failed to close partial session");
                }
                Err(self.fail(
                    ExportFailure::new(tracker.stage(), error)
                        .with_coercion_report(coercion_report)
                        .with_partial(partial_session(&session, report, closed.is_ok())),
                ))
            }
        }
    }

    fn fail(&self, failure: ExportFailure) -> ExportFailure {
        if !failure.is_cancelled() {
            crate::log_error_with_context!(failure.error, failure.stage.pending_step());
        }
        failure.log_summary();
        failure
    }
}

/// Result of the stages that run before the sink is contacted
#[derive(Debug, Clone)]
pub struct ExportPlan {
    /// Coerced dataset
    pub data: CoercedDataset,

    /// Per-column coercion outcomes
    pub coercion_report: CoercionReport,

    /// Time origin and day of the session
    pub origin: SessionOrigin,

    /// Lap the session starts in
    pub start_lap: u32,

    /// Channels in write order
    pub channels: Vec<ChannelSpec>,
}

fn run_pure_stages(
    dataset: &Dataset,
    group: &str,
    tracker: &mut StageTracker,
) -> std::result::Result<ExportPlan, ExportFailure> {
    let schema = validate(dataset)
        .into_result()
        .map_err(|e| ExportFailure::new(tracker.stage(), e))?;
    tracker.advance();

    let (data, coercion_report) = coerce(dataset, &schema);
    coercion_report.log_summary();
    if let Some(e) = coercion_report.first_failure() {
        return Err(ExportFailure::new(tracker.stage(), e).with_coercion_report(coercion_report));
    }
    tracker.advance();

    let origin = match bind(data.timestamps()) {
        Ok(origin) => origin,
        Err(e) => {
            return Err(ExportFailure::new(tracker.stage(), e).with_coercion_report(coercion_report))
        }
    };
    let lap = start_lap(&data);
    tracker.advance();

    let channels = match map_channels(data.labels(), group) {
        Ok(channels) => channels,
        Err(e) => {
            return Err(ExportFailure::new(tracker.stage(), e).with_coercion_report(coercion_report))
        }
    };
    tracker.advance();

    Ok(ExportPlan {
        data,
        coercion_report,
        origin,
        start_lap: lap,
        channels,
    })
}

/// Run validation, coercion, binding and mapping without a sink
///
/// Succeeds exactly when an export of `dataset` would reach the sink.
///
/// # Errors
///
/// Returns an [`ExportFailure`] tagged with the last stage reached
pub fn plan_export(dataset: &Dataset, group: &str) -> std::result::Result<ExportPlan, ExportFailure> {
    run_pure_stages(dataset, group, &mut StageTracker::new())
}

fn partial_session(session: &SessionHandle, report: WriteReport, closed: bool) -> PartialSession {
    PartialSession {
        session: session.key,
        last_complete_channel: report.last_complete_channel().map(|c| c.name.clone()),
        report,
        closed,
    }
}

/// Export a dataset in one call
///
/// Uses the default application group, a derived session identifier and the
/// default retry policy.
///
/// # Errors
///
/// Returns an [`ExportFailure`] for an out-of-range `batch_size`, tagged with
/// [`ExportStage::Created`], and for every pipeline failure.
///
/// # Example
///
/// ```rust
/// use sessionframe::adapters::memory::MemorySink;
/// use sessionframe::core::export::{export, NoopProgress};
/// use sessionframe::domain::{Column, Dataset};
/// use chrono::NaiveDate;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let t0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let dataset = Dataset::builder()
///     .datetime_index(vec![t0])
///     .column("speed", Column::Float(vec![1.0]))
///     .build();
///
/// let sink = Arc::new(MemorySink::new());
/// let outcome = export(&dataset, sink.clone(), 5000, &NoopProgress).await.unwrap();
/// assert_eq!(outcome.write_report.total_samples, 1);
/// assert_eq!(sink.calls().close_session, 1);
/// # }
/// ```
pub async fn export(
    dataset: &Dataset,
    sink: Arc<dyn SessionSink>,
    batch_size: usize,
    progress: &dyn ProgressObserver,
) -> std::result::Result<ExportOutcome, ExportFailure> {
    let batch = BatchConfig::new(batch_size, Default::default()).map_err(|e| {
        ExportFailure::new(ExportStage::Created, PipelineError::InvalidOptions(e.to_string()))
    })?;
    let options = ExportOptions {
        batch,
        ..ExportOptions::default()
    };
    ExportCoordinator::new(sink, options)
        .execute_export(dataset, progress)
        .await
}
