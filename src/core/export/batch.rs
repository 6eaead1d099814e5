//! Batch writing of channel samples
//!
//! This module turns coerced columns into sample sequences, partitions them into
//! bounded batches and streams them to the sink channel by channel. A channel is
//! created right before its first batch, so at any point the session holds a
//! prefix of the channel list plus at most one partially written channel.

use crate::adapters::sink::SessionSink;
use crate::core::export::progress::{ProgressEvent, ProgressObserver};
use crate::core::export::summary::{ChannelWriteStats, WriteFailure, WriteReport};
use crate::core::transform::CoercedDataset;
use crate::domain::errors::{PipelineError, SinkOperation, WriteError};
use crate::domain::session::{ChannelHandle, ChannelSpec, Sample, SessionHandle, SessionOrigin};
use crate::domain::{Result, SessionFrameError};
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Default samples per batch
pub const DEFAULT_BATCH_SIZE: usize = 5_000;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 100_000;

/// Retry policy for a single batch write
///
/// Fixed delay, no backoff: the sink is a local boundary, not a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Wait between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Retries without waiting
    pub fn immediate(max_retries: usize) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }

    /// Upper bound on attempts per batch
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Configuration for batch writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Samples per batch (1-100000)
    pub batch_size: usize,

    /// Retry policy per batch
    pub retry: RetryPolicy,
}

impl BatchConfig {
    /// Create a new batch configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is outside 1..=100000
    pub fn new(batch_size: usize, retry: RetryPolicy) -> Result<Self> {
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(SessionFrameError::Configuration(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        Ok(Self { batch_size, retry })
    }

    /// Create from export config values
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is out of range
    pub fn from_config(batch_size: usize, max_retries: usize, retry_delay_ms: u64) -> Result<Self> {
        Self::new(
            batch_size,
            RetryPolicy::new(max_retries, Duration::from_millis(retry_delay_ms)),
        )
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Builds a channel's samples, skipping missing values
///
/// Offsets are relative to the session origin. The binder guarantees no
/// timestamp precedes the origin.
pub fn build_samples(origin: &SessionOrigin, timestamps: &[NaiveDateTime], values: &[f64]) -> Vec<Sample> {
    timestamps
        .iter()
        .zip(values)
        .filter(|(_, value)| !value.is_nan())
        .map(|(ts, &value)| Sample::new(origin.offset_of(ts).unwrap_or_default(), value))
        .collect()
}

/// Number of batches needed for `sample_count` samples
///
/// # Examples
///
/// ```
/// use sessionframe::core::export::batch::batch_count;
///
/// assert_eq!(batch_count(10_000, 3_000), 4);
/// assert_eq!(batch_count(0, 3_000), 0);
/// ```
pub fn batch_count(sample_count: usize, batch_size: usize) -> usize {
    sample_count.div_ceil(batch_size.max(1))
}

/// Contiguous batches of at most `batch_size` samples, in order
pub fn partition(samples: &[Sample], batch_size: usize) -> std::slice::Chunks<'_, Sample> {
    samples.chunks(batch_size.max(1))
}

/// Streams coerced data into an open session
pub struct BatchWriter {
    sink: Arc<dyn SessionSink>,
    config: BatchConfig,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl BatchWriter {
    /// Create a new batch writer
    pub fn new(sink: Arc<dyn SessionSink>, config: BatchConfig) -> Self {
        Self {
            sink,
            config,
            shutdown_signal: None,
        }
    }

    /// Stop between batches once the signal turns `true`
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Batch configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }

    /// Write every channel of `data` into `session`
    ///
    /// Channels are written in `specs` order, each one completely before the next,
    /// batches in time order. The progress observer is notified after each batch.
    /// Cancellation is checked before every batch, never during one.
    ///
    /// # Arguments
    ///
    /// * `session` - Open session
    /// * `origin` - Time origin the session was created with
    /// * `specs` - Channels to write, positions refer to columns of `data`
    /// * `data` - Coerced dataset
    /// * `progress` - Observer for per-batch events
    ///
    /// # Errors
    ///
    /// Returns a [`WriteFailure`] carrying the report of everything written before
    /// the failure. The error is [`PipelineError::Write`] when a batch exhausts its
    /// retries, [`PipelineError::Sink`] when a channel cannot be created, and
    /// [`PipelineError::Cancelled`] on shutdown.
    pub async fn write(
        &self,
        session: &SessionHandle,
        origin: &SessionOrigin,
        specs: &[ChannelSpec],
        data: &CoercedDataset,
        progress: &dyn ProgressObserver,
    ) -> std::result::Result<WriteReport, WriteFailure> {
        let start = Instant::now();
        let mut report = WriteReport::new();

        for (channel_index, spec) in specs.iter().enumerate() {
            let values = data
                .column(spec.position)
                .map(|c| c.values.as_slice())
                .unwrap_or(&[]);
            let samples = build_samples(origin, data.timestamps(), values);
            let total_batches = batch_count(samples.len(), self.config.batch_size);

            if total_batches == 0 {
                tracing::warn!(
                    channel = %spec.name,
                    "Column has no values, channel will be empty"
                );
            }

            let mut stats = ChannelWriteStats::new(spec, total_batches);

            if self.is_shutdown_requested() {
                return Err(report.cancelled(start));
            }

            let channel = match self.sink.create_channel(session, spec).await {
                Ok(channel) => channel,
                Err(e) => {
                    return Err(report.fail(
                        PipelineError::sink(SinkOperation::CreateChannel, e),
                        start,
                    ))
                }
            };

            for (batch_index, batch) in partition(&samples, self.config.batch_size).enumerate() {
                if batch_index > 0 && self.is_shutdown_requested() {
                    report.record_partial(stats);
                    return Err(report.cancelled(start));
                }

                match self.write_with_retry(&channel, batch, batch_index).await {
                    Ok(attempts) => stats.record_batch(batch.len(), attempts),
                    Err(e) => {
                        report.record_partial(stats);
                        return Err(report.fail(e.into(), start));
                    }
                }

                crate::log_batch_processing!(spec.name, batch_index + 1, total_batches);
                progress.on_progress(ProgressEvent {
                    channel_index,
                    channel_name: spec.name.to_string(),
                    batch_index,
                    total_batches,
                    samples_in_batch: batch.len(),
                });
            }

            tracing::debug!(
                channel = %spec.name,
                samples = stats.samples_written,
                batches = stats.batches_written,
                "Channel complete"
            );
            report.record_channel(stats);
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    /// Write one batch, retrying on failure
    ///
    /// Returns the number of attempts used.
    async fn write_with_retry(
        &self,
        channel: &ChannelHandle,
        samples: &[Sample],
        batch_index: usize,
    ) -> std::result::Result<usize, WriteError> {
        let policy = self.config.retry;
        let max_attempts = policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.sink.write_batch(channel, samples).await {
                Ok(()) => return Ok(attempt),
                Err(e) if attempt < max_attempts => {
                    crate::log_retry_attempt!(attempt, max_attempts, e);
                    if !policy.delay.is_zero() {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        channel = %channel.name,
                        batch_index,
                        attempts = attempt,
                        error = %e,
                        "Batch write failed after all retries"
                    );
                    return Err(WriteError {
                        channel: channel.name.to_string(),
                        batch_index,
                        attempts: attempt,
                        cause: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn origin() -> SessionOrigin {
        SessionOrigin::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_batch_config_range() {
        assert!(BatchConfig::new(0, RetryPolicy::default()).is_err());
        assert!(BatchConfig::new(MAX_BATCH_SIZE + 1, RetryPolicy::default()).is_err());
        let config = BatchConfig::new(3000, RetryPolicy::immediate(2)).unwrap();
        assert_eq!(config.batch_size, 3000);
        assert_eq!(config.retry.max_attempts(), 3);
    }

    #[test]
    fn test_batch_config_from_config() {
        let config = BatchConfig::from_config(500, 5, 250).unwrap();
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(250)));
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_millis(100));
        assert_eq!(BatchConfig::default().batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_build_samples_skips_missing() {
        let origin = origin();
        let timestamps: Vec<_> = (0..4)
            .map(|i| origin.time_origin + chrono::Duration::milliseconds(i * 500))
            .collect();
        let samples = build_samples(&origin, &timestamps, &[1.0, f64::NAN, 3.0, 4.0]);

        assert_eq!(
            samples,
            vec![
                Sample::new(0, 1.0),
                Sample::new(1_000_000_000, 3.0),
                Sample::new(1_500_000_000, 4.0),
            ]
        );
    }

    #[test_case(0, 3, 0)]
    #[test_case(1, 3, 1)]
    #[test_case(3, 3, 1)]
    #[test_case(4, 3, 2)]
    #[test_case(10_000, 3_000, 4)]
    fn test_batch_count(samples: usize, size: usize, expected: usize) {
        assert_eq!(batch_count(samples, size), expected);
    }

    #[test]
    fn test_partition_reconstructs_sequence() {
        let samples: Vec<Sample> = (0..10u64).map(|i| Sample::new(i, i as f64)).collect();
        for size in 1..=11 {
            let batches: Vec<&[Sample]> = partition(&samples, size).collect();
            assert_eq!(batches.len(), batch_count(samples.len(), size));
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
            assert_eq!(batches.concat(), samples);
        }
    }
}
