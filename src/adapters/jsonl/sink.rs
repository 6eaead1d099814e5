//! JSON-lines session sink
//!
//! Writes each session into its own directory. The manifest is written when the
//! session opens and rewritten on every channel creation and on close, so a
//! directory left behind by an interrupted export still describes what it holds.

use super::models::{
    channel_file_name, ChannelManifest, SessionManifest, CHANNELS_DIR, MANIFEST_FILE,
};
use crate::adapters::sink::SessionSink;
use crate::domain::errors::SinkError;
use crate::domain::ids::SessionKey;
use crate::domain::session::{ChannelHandle, ChannelSpec, Sample, SessionHandle, SessionRequest};
use crate::domain::{Result, SessionFrameError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

struct OpenSession {
    dir: PathBuf,
    manifest: SessionManifest,
}

/// Session sink writing JSON-lines files
pub struct JsonlSink {
    root: PathBuf,
    sessions: Mutex<HashMap<SessionKey, OpenSession>>,
}

impl JsonlSink {
    /// Creates a sink writing below `root`
    ///
    /// The directory is created with the first session.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `root` is empty.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(SessionFrameError::Configuration(
                "JSON-lines sink output directory cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            root,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Output root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a session
    pub fn session_dir(&self, key: &SessionKey) -> PathBuf {
        self.root.join(key.to_string())
    }

    /// Reads a session manifest back from disk
    pub async fn read_manifest(session_dir: &Path) -> Result<SessionManifest> {
        let content = fs::read_to_string(session_dir.join(MANIFEST_FILE)).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

async fn write_manifest(dir: &Path, manifest: &SessionManifest) -> std::result::Result<(), SinkError> {
    let tmp = dir.join(format!("{MANIFEST_FILE}.tmp"));
    let body = serde_json::to_vec_pretty(manifest)?;
    fs::write(&tmp, body).await?;
    fs::rename(&tmp, dir.join(MANIFEST_FILE)).await?;
    Ok(())
}

/// Channel file that can be cut back after a failed append
#[async_trait]
trait AppendTarget: AsyncWrite + Unpin + Send {
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

#[async_trait]
impl AppendTarget for fs::File {
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }
}

/// Appends `buf`, or leaves the target at `previous_len` on failure
///
/// A failed attempt writes nothing, so the same batch can be retried.
async fn append_or_rollback<T: AppendTarget>(
    target: &mut T,
    previous_len: u64,
    buf: &[u8],
) -> std::io::Result<()> {
    let written = async {
        target.write_all(buf).await?;
        target.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(rollback) = target.truncate_to(previous_len).await {
            tracing::error!(
                error = %rollback,
                previous_len,
                "Failed to roll back partial batch"
            );
        }
        return Err(e);
    }
    Ok(())
}

fn encode_samples(samples: &[Sample]) -> std::result::Result<Vec<u8>, SinkError> {
    let mut buf = Vec::with_capacity(samples.len() * 40);
    for sample in samples {
        serde_json::to_writer(&mut buf, sample)?;
        buf.push(b'\n');
    }
    Ok(buf)
}

#[async_trait]
impl SessionSink for JsonlSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> std::result::Result<SessionHandle, SinkError> {
        let key = SessionKey::generate();
        let dir = self.session_dir(&key);
        fs::create_dir_all(dir.join(CHANNELS_DIR)).await?;

        let manifest = SessionManifest::new(key, request);
        write_manifest(&dir, &manifest).await?;

        tracing::info!(session = %key, dir = %dir.display(), "Session directory created");
        self.sessions
            .lock()
            .await
            .insert(key, OpenSession { dir, manifest });

        Ok(SessionHandle {
            key,
            identifier: request.identifier.clone(),
        })
    }

    async fn create_channel(
        &self,
        session: &SessionHandle,
        spec: &ChannelSpec,
    ) -> std::result::Result<ChannelHandle, SinkError> {
        let mut sessions = self.sessions.lock().await;
        let open = sessions
            .get_mut(&session.key)
            .ok_or_else(|| SinkError::UnknownSession(session.key.to_string()))?;

        if open
            .manifest
            .channels
            .iter()
            .any(|c| c.name == spec.name.as_str())
        {
            return Err(SinkError::Rejected(format!(
                "channel '{}' already exists",
                spec.name
            )));
        }

        let channel_id = u32::try_from(open.manifest.channels.len())
            .map_err(|_| SinkError::Rejected("too many channels".to_string()))?;
        let path = open.dir.join(CHANNELS_DIR).join(channel_file_name(channel_id));
        fs::File::create(&path).await?;

        open.manifest
            .channels
            .push(ChannelManifest::new(channel_id, spec));
        write_manifest(&open.dir, &open.manifest).await?;

        Ok(ChannelHandle {
            session: session.key,
            channel_id,
            name: spec.name.clone(),
        })
    }

    async fn write_batch(
        &self,
        channel: &ChannelHandle,
        samples: &[Sample],
    ) -> std::result::Result<(), SinkError> {
        let mut sessions = self.sessions.lock().await;
        let open = sessions
            .get_mut(&channel.session)
            .ok_or_else(|| SinkError::UnknownSession(channel.session.to_string()))?;
        let entry = open
            .manifest
            .channels
            .iter_mut()
            .find(|c| c.id == channel.channel_id)
            .ok_or_else(|| SinkError::UnknownChannel(channel.name.to_string()))?;

        if let (Some(prev), Some(first)) = (entry.last_offset_ns, samples.first()) {
            if first.offset_ns < prev {
                return Err(SinkError::Rejected(format!(
                    "offset {} precedes {prev} on channel '{}'",
                    first.offset_ns, channel.name
                )));
            }
        }

        let buf = encode_samples(samples)?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(open.dir.join(&entry.file))
            .await?;
        let previous_len = file.metadata().await?.len();
        append_or_rollback(&mut file, previous_len, &buf).await?;

        entry.samples += samples.len();
        entry.batches += 1;
        if let Some(last) = samples.last() {
            entry.last_offset_ns = Some(last.offset_ns);
        }
        Ok(())
    }

    async fn close_session(&self, session: SessionHandle) -> std::result::Result<(), SinkError> {
        let mut open = self
            .sessions
            .lock()
            .await
            .remove(&session.key)
            .ok_or_else(|| SinkError::UnknownSession(session.key.to_string()))?;

        open.manifest.closed_at = Some(Utc::now());
        write_manifest(&open.dir, &open.manifest).await?;

        tracing::info!(
            session = %session.key,
            channels = open.manifest.channels.len(),
            "Session closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ChannelName;
    use crate::domain::session::SessionOrigin;
    use chrono::NaiveDate;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;

    fn request() -> SessionRequest {
        let t0 = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        SessionRequest::new("Bench run", SessionOrigin::new(t0))
    }

    fn spec(name: &str) -> ChannelSpec {
        ChannelSpec {
            position: 0,
            name: ChannelName::new(name).unwrap(),
            group: "SessionFrame".to_string(),
        }
    }

    /// Accepts `budget` bytes, then fails every write
    struct TornWriter {
        data: Vec<u8>,
        budget: usize,
    }

    impl AsyncWrite for TornWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            let this = self.get_mut();
            if this.budget == 0 {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "no space left on device",
                )));
            }
            let n = buf.len().min(this.budget);
            this.budget -= n;
            this.data.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[async_trait]
    impl AppendTarget for TornWriter {
        async fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_partial_append_is_rolled_back_before_retry() {
        let existing = encode_samples(&[Sample::new(0, 1.0)]).unwrap();
        let batch = encode_samples(&[Sample::new(1_000, 2.0), Sample::new(2_000, 3.0)]).unwrap();
        let mut writer = TornWriter {
            data: existing.clone(),
            budget: 10,
        };

        let previous_len = writer.data.len() as u64;
        assert!(append_or_rollback(&mut writer, previous_len, &batch).await.is_err());
        assert_eq!(writer.data, existing);

        writer.budget = usize::MAX;
        append_or_rollback(&mut writer, previous_len, &batch).await.unwrap();

        let samples: Vec<Sample> = String::from_utf8(writer.data)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            samples,
            vec![Sample::new(0, 1.0), Sample::new(1_000, 2.0), Sample::new(2_000, 3.0)]
        );
    }

    #[tokio::test]
    async fn test_file_rollback_truncates_to_previous_length() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("00000.jsonl");
        fs::write(&path, b"{\"offset_ns\":0,\"value\":1.0}\n{\"offs")
            .await
            .unwrap();

        let mut file = fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.truncate_to(28).await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "{\"offset_ns\":0,\"value\":1.0}\n");
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(JsonlSink::new("").is_err());
    }

    #[tokio::test]
    async fn test_writes_session_layout() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonlSink::new(tmp.path()).unwrap();

        let session = sink.create_session(&request()).await.unwrap();
        let channel = sink.create_channel(&session, &spec("speed")).await.unwrap();
        sink.write_batch(&channel, &[Sample::new(0, 1.5), Sample::new(1_000, 2.5)])
            .await
            .unwrap();
        sink.write_batch(&channel, &[Sample::new(2_000, 3.5)])
            .await
            .unwrap();
        sink.close_session(session.clone()).await.unwrap();

        let dir = sink.session_dir(&session.key);
        let manifest = JsonlSink::read_manifest(&dir).await.unwrap();
        assert!(manifest.is_closed());
        assert_eq!(manifest.identifier, "Bench run");
        assert_eq!(manifest.channels.len(), 1);
        assert_eq!(manifest.channels[0].samples, 3);
        assert_eq!(manifest.channels[0].batches, 2);

        let lines = fs::read_to_string(dir.join(&manifest.channels[0].file))
            .await
            .unwrap();
        let samples: Vec<Sample> = lines
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(samples[2], Sample::new(2_000, 3.5));
    }

    #[tokio::test]
    async fn test_manifest_present_while_open() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonlSink::new(tmp.path()).unwrap();
        let session = sink.create_session(&request()).await.unwrap();
        sink.create_channel(&session, &spec("speed")).await.unwrap();

        let manifest = JsonlSink::read_manifest(&sink.session_dir(&session.key))
            .await
            .unwrap();
        assert!(!manifest.is_closed());
        assert_eq!(manifest.channels[0].name, "speed");
    }

    #[tokio::test]
    async fn test_unknown_session_after_close() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonlSink::new(tmp.path()).unwrap();
        let session = sink.create_session(&request()).await.unwrap();
        sink.close_session(session.clone()).await.unwrap();

        let err = sink
            .create_channel(&session, &spec("speed"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_rejects_duplicate_channel() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonlSink::new(tmp.path()).unwrap();
        let session = sink.create_session(&request()).await.unwrap();
        sink.create_channel(&session, &spec("speed")).await.unwrap();
        assert!(sink.create_channel(&session, &spec("speed")).await.is_err());
    }
}
