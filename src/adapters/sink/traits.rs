//! Session sink traits
//!
//! This module defines the contract a recording store must implement to receive
//! exported sessions. The pipeline depends on nothing else about the store.

use crate::domain::errors::SinkError;
use crate::domain::session::{ChannelHandle, ChannelSpec, Sample, SessionHandle, SessionRequest};
use async_trait::async_trait;

/// Write contract of a time-series recording store
///
/// An exporter owns the session it creates until it closes it. Implementations
/// must accept concurrent calls for different sessions if they are shared between
/// exports; calls for one session arrive strictly in order.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Open a new session
    ///
    /// # Arguments
    ///
    /// * `request` - Identifier, event type and time origin of the session
    ///
    /// # Returns
    ///
    /// A handle carrying the key the store assigned to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot create the session.
    async fn create_session(&self, request: &SessionRequest) -> Result<SessionHandle, SinkError>;

    /// Create a channel inside an open session
    ///
    /// # Arguments
    ///
    /// * `session` - Session returned by [`SessionSink::create_session`]
    /// * `spec` - Channel name and parent group
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or the store rejects the channel.
    async fn create_channel(
        &self,
        session: &SessionHandle,
        spec: &ChannelSpec,
    ) -> Result<ChannelHandle, SinkError>;

    /// Append samples to a channel
    ///
    /// Samples arrive in non-decreasing offset order and continue where the previous
    /// batch for the same channel ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The caller may retry the same batch.
    async fn write_batch(&self, channel: &ChannelHandle, samples: &[Sample])
        -> Result<(), SinkError>;

    /// Close a session, releasing any store resources held for it
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or cannot be finalized.
    async fn close_session(&self, session: SessionHandle) -> Result<(), SinkError>;
}
