//! Progress reporting
//!
//! The batch writer pushes one event after every written batch. Observers are
//! fire-and-forget: the writer never waits on them and ignores anything they do.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Notification that one batch reached the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Index of the channel in write order
    pub channel_index: usize,

    /// Channel name
    pub channel_name: String,

    /// Zero-based index of the batch within its channel
    pub batch_index: usize,

    /// Number of batches for this channel
    pub total_batches: usize,

    /// Samples carried by the batch
    pub samples_in_batch: usize,
}

impl ProgressEvent {
    /// True for the last batch of a channel
    pub fn is_channel_complete(&self) -> bool {
        self.batch_index + 1 == self.total_batches
    }
}

/// Receives progress events from the batch writer
///
/// Implementations must return quickly. Closures taking a [`ProgressEvent`] and
/// unbounded channel senders implement this trait directly.
///
/// # Examples
///
/// ```
/// use sessionframe::core::export::{ProgressEvent, ProgressObserver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let calls = AtomicUsize::new(0);
/// let observer = |_event: ProgressEvent| {
///     calls.fetch_add(1, Ordering::Relaxed);
/// };
///
/// observer.on_progress(ProgressEvent {
///     channel_index: 0,
///     channel_name: "speed".to_string(),
///     batch_index: 0,
///     total_batches: 1,
///     samples_in_batch: 3,
/// });
/// assert_eq!(calls.load(Ordering::Relaxed), 1);
/// ```
pub trait ProgressObserver: Send + Sync {
    /// Called once per written batch
    fn on_progress(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}

/// Logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, event: ProgressEvent) {
        if event.is_channel_complete() {
            tracing::info!(
                channel = %event.channel_name,
                channel_index = event.channel_index,
                batches = event.total_batches,
                "Channel written"
            );
        } else {
            tracing::debug!(
                channel = %event.channel_name,
                batch = event.batch_index + 1,
                total = event.total_batches,
                samples = event.samples_in_batch,
                "Batch written"
            );
        }
    }
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressObserver for UnboundedSender<ProgressEvent> {
    fn on_progress(&self, event: ProgressEvent) {
        // A closed receiver only means nobody is watching anymore
        let _ = self.send(event);
    }
}
