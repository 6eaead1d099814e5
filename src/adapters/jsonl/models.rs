//! On-disk layout of JSON-lines sessions
//!
//! ```text
//! <output_dir>/<session key>/session.json
//! <output_dir>/<session key>/channels/00000.jsonl
//! ```
//!
//! Each channel file holds one `{"offset_ns":..,"value":..}` object per line.

use crate::domain::ids::SessionKey;
use crate::domain::session::{ChannelSpec, SessionRequest};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Manifest file name inside a session directory
pub const MANIFEST_FILE: &str = "session.json";

/// Channel directory name inside a session directory
pub const CHANNELS_DIR: &str = "channels";

/// File name of a channel's sample file
pub fn channel_file_name(channel_id: u32) -> String {
    format!("{channel_id:05}.jsonl")
}

/// Session manifest, `session.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionManifest {
    /// Session key
    pub key: SessionKey,

    /// Session identifier
    pub identifier: String,

    /// Event type
    pub event_type: String,

    /// First timestamp of the session
    pub time_origin: NaiveDateTime,

    /// Calendar day of the session
    pub day: NaiveDate,

    /// Time origin in nanoseconds since midnight of `day`
    pub origin_nanos_since_midnight: u64,

    /// Lap marked at the time origin
    pub start_lap: LapManifest,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session was closed, absent while open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Channels in creation order
    pub channels: Vec<ChannelManifest>,
}

impl SessionManifest {
    /// Creates the manifest of a freshly opened session
    pub fn new(key: SessionKey, request: &SessionRequest) -> Self {
        Self {
            key,
            identifier: request.identifier.clone(),
            event_type: request.event_type.clone(),
            time_origin: request.origin.time_origin,
            day: request.origin.day,
            origin_nanos_since_midnight: request.origin.origin_nanos_since_midnight(),
            start_lap: LapManifest {
                number: request.start_lap,
                name: request.start_lap_name(),
                offset_ns: 0,
            },
            created_at: Utc::now(),
            closed_at: None,
            channels: Vec::new(),
        }
    }

    /// True once the session was closed
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// Lap marker of a [`SessionManifest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapManifest {
    /// Lap number
    pub number: u32,

    /// Display name, `"Lap {number}"`
    pub name: String,

    /// Nanoseconds since the time origin
    pub offset_ns: u64,
}

/// One channel entry of a [`SessionManifest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelManifest {
    /// Channel id within the session
    pub id: u32,

    /// Channel name
    pub name: String,

    /// Parent application group
    pub group: String,

    /// Store-level parameter identifier
    pub identifier: String,

    /// Sample file relative to the session directory
    pub file: String,

    /// Samples written
    pub samples: usize,

    /// Batches written
    pub batches: usize,

    /// Offset of the last sample written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_offset_ns: Option<u64>,
}

impl ChannelManifest {
    /// Creates an empty channel entry
    pub fn new(id: u32, spec: &ChannelSpec) -> Self {
        Self {
            id,
            name: spec.name.to_string(),
            group: spec.group.clone(),
            identifier: spec.identifier(),
            file: format!("{CHANNELS_DIR}/{}", channel_file_name(id)),
            samples: 0,
            batches: 0,
            last_offset_ns: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ChannelName;
    use crate::domain::session::SessionOrigin;

    #[test]
    fn test_channel_file_name() {
        assert_eq!(channel_file_name(0), "00000.jsonl");
        assert_eq!(channel_file_name(42), "00042.jsonl");
    }

    #[test]
    fn test_manifest_from_request() {
        let t0 = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(10, 10, 10)
            .unwrap();
        let request = SessionRequest::new("Run 7", SessionOrigin::new(t0));
        let manifest = SessionManifest::new(SessionKey::generate(), &request);

        assert_eq!(manifest.identifier, "Run 7");
        assert_eq!(manifest.event_type, "Session");
        assert_eq!(manifest.origin_nanos_since_midnight, 36_610_000_000_000);
        assert_eq!(manifest.start_lap.number, 1);
        assert_eq!(manifest.start_lap.name, "Lap 1");
        assert!(!manifest.is_closed());

        let lap4 = SessionManifest::new(SessionKey::generate(), &request.with_start_lap(4));
        assert_eq!(lap4.start_lap.name, "Lap 4");

        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("closed_at").is_none());
    }

    #[test]
    fn test_channel_manifest_from_spec() {
        let spec = ChannelSpec {
            position: 3,
            name: ChannelName::new("speed").unwrap(),
            group: "Bench".to_string(),
        };
        let entry = ChannelManifest::new(3, &spec);
        assert_eq!(entry.identifier, "speed:Bench");
        assert_eq!(entry.file, "channels/00003.jsonl");
    }
}
