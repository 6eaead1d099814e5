//! In-memory session sink
//!
//! Records everything it receives. Used for dry runs, where only counts are kept,
//! and as the reference sink in tests.

use crate::adapters::sink::SessionSink;
use crate::domain::errors::SinkError;
use crate::domain::ids::SessionKey;
use crate::domain::session::{ChannelHandle, ChannelSpec, Sample, SessionHandle, SessionRequest};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Number of calls received per sink operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCallCounts {
    /// `create_session` calls
    pub create_session: usize,
    /// `create_channel` calls
    pub create_channel: usize,
    /// `write_batch` calls
    pub write_batch: usize,
    /// `close_session` calls
    pub close_session: usize,
}

/// A channel as recorded by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedChannel {
    /// Handle returned on creation
    pub handle: ChannelHandle,

    /// Spec the channel was created from
    pub spec: ChannelSpec,

    /// Samples in write order, empty when samples are not retained
    pub samples: Vec<Sample>,

    /// Number of samples received
    pub sample_count: usize,

    /// Number of batches received
    pub batches: usize,

    last_offset: Option<u64>,
}

/// A session as recorded by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSession {
    /// Handle returned on creation
    pub handle: SessionHandle,

    /// Request the session was created from
    pub request: SessionRequest,

    /// Channels in creation order
    pub channels: Vec<RecordedChannel>,

    /// True once `close_session` was received
    pub closed: bool,
}

impl RecordedSession {
    /// Channel with the given name
    pub fn channel(&self, name: &str) -> Option<&RecordedChannel> {
        self.channels.iter().find(|c| c.spec.name.as_str() == name)
    }

    /// Samples received across all channels
    pub fn sample_count(&self) -> usize {
        self.channels.iter().map(|c| c.sample_count).sum()
    }
}

/// Session sink that keeps sessions in memory
///
/// Enforces the store rules a real recording store applies: unique channel names
/// per session, non-decreasing offsets per channel, and no writes after close.
///
/// # Examples
///
/// ```
/// use sessionframe::adapters::memory::MemorySink;
///
/// let sink = MemorySink::new();
/// assert_eq!(sink.calls().create_session, 0);
/// ```
#[derive(Debug)]
pub struct MemorySink {
    sessions: Mutex<Vec<RecordedSession>>,
    retain_samples: bool,
    create_session_calls: AtomicUsize,
    create_channel_calls: AtomicUsize,
    write_batch_calls: AtomicUsize,
    close_session_calls: AtomicUsize,
}

impl MemorySink {
    /// Creates a sink that retains every sample
    pub fn new() -> Self {
        Self::with_retention(true)
    }

    /// Creates a sink that only counts samples
    pub fn counting_only() -> Self {
        Self::with_retention(false)
    }

    fn with_retention(retain_samples: bool) -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            retain_samples,
            create_session_calls: AtomicUsize::new(0),
            create_channel_calls: AtomicUsize::new(0),
            write_batch_calls: AtomicUsize::new(0),
            close_session_calls: AtomicUsize::new(0),
        }
    }

    /// Calls received so far
    pub fn calls(&self) -> SinkCallCounts {
        SinkCallCounts {
            create_session: self.create_session_calls.load(Ordering::SeqCst),
            create_channel: self.create_channel_calls.load(Ordering::SeqCst),
            write_batch: self.write_batch_calls.load(Ordering::SeqCst),
            close_session: self.close_session_calls.load(Ordering::SeqCst),
        }
    }

    /// Snapshot of all sessions in creation order
    pub async fn sessions(&self) -> Vec<RecordedSession> {
        self.sessions.lock().await.clone()
    }

    /// Snapshot of one session
    pub async fn session(&self, key: &SessionKey) -> Option<RecordedSession> {
        self.sessions
            .lock()
            .await
            .iter()
            .find(|s| &s.handle.key == key)
            .cloned()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

fn open_session<'a>(
    sessions: &'a mut [RecordedSession],
    key: &SessionKey,
) -> Result<&'a mut RecordedSession, SinkError> {
    let session = sessions
        .iter_mut()
        .find(|s| &s.handle.key == key)
        .ok_or_else(|| SinkError::UnknownSession(key.to_string()))?;
    if session.closed {
        return Err(SinkError::Rejected(format!("session {key} is closed")));
    }
    Ok(session)
}

#[async_trait]
impl SessionSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_session(&self, request: &SessionRequest) -> Result<SessionHandle, SinkError> {
        self.create_session_calls.fetch_add(1, Ordering::SeqCst);

        let handle = SessionHandle {
            key: SessionKey::generate(),
            identifier: request.identifier.clone(),
        };
        self.sessions.lock().await.push(RecordedSession {
            handle: handle.clone(),
            request: request.clone(),
            channels: Vec::new(),
            closed: false,
        });

        tracing::debug!(session = %handle.key, "Memory session created");
        Ok(handle)
    }

    async fn create_channel(
        &self,
        session: &SessionHandle,
        spec: &ChannelSpec,
    ) -> Result<ChannelHandle, SinkError> {
        self.create_channel_calls.fetch_add(1, Ordering::SeqCst);

        let mut sessions = self.sessions.lock().await;
        let recorded = open_session(&mut sessions, &session.key)?;

        if recorded.channel(spec.name.as_str()).is_some() {
            return Err(SinkError::Rejected(format!(
                "channel '{}' already exists",
                spec.name
            )));
        }

        let channel_id = u32::try_from(recorded.channels.len())
            .map_err(|_| SinkError::Rejected("too many channels".to_string()))?;
        let handle = ChannelHandle {
            session: session.key,
            channel_id,
            name: spec.name.clone(),
        };
        recorded.channels.push(RecordedChannel {
            handle: handle.clone(),
            spec: spec.clone(),
            samples: Vec::new(),
            sample_count: 0,
            batches: 0,
            last_offset: None,
        });

        Ok(handle)
    }

    async fn write_batch(
        &self,
        channel: &ChannelHandle,
        samples: &[Sample],
    ) -> Result<(), SinkError> {
        self.write_batch_calls.fetch_add(1, Ordering::SeqCst);

        let mut sessions = self.sessions.lock().await;
        let recorded = open_session(&mut sessions, &channel.session)?;
        let target = recorded
            .channels
            .iter_mut()
            .find(|c| c.handle.channel_id == channel.channel_id)
            .ok_or_else(|| SinkError::UnknownChannel(channel.name.to_string()))?;

        let mut last = target.last_offset;
        for sample in samples {
            if last.is_some_and(|prev| sample.offset_ns < prev) {
                return Err(SinkError::Rejected(format!(
                    "offset {} precedes {} on channel '{}'",
                    sample.offset_ns,
                    last.unwrap_or_default(),
                    channel.name
                )));
            }
            last = Some(sample.offset_ns);
        }

        target.last_offset = last;
        target.sample_count += samples.len();
        target.batches += 1;
        if self.retain_samples {
            target.samples.extend_from_slice(samples);
        }
        Ok(())
    }

    async fn close_session(&self, session: SessionHandle) -> Result<(), SinkError> {
        self.close_session_calls.fetch_add(1, Ordering::SeqCst);

        let mut sessions = self.sessions.lock().await;
        let recorded = open_session(&mut sessions, &session.key)?;
        recorded.closed = true;

        tracing::debug!(
            session = %session.key,
            channels = recorded.channels.len(),
            samples = recorded.sample_count(),
            "Memory session closed"
        );
        Ok(())
    }
}
