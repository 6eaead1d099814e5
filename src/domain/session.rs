//! Session, channel and sample models
//!
//! These are the values that flow from the pipeline into a session sink.

use crate::domain::ids::{ChannelName, SessionKey};
use crate::domain::time::{nanos_since_midnight, offset_nanos};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Event type given to every exported session
pub const DEFAULT_EVENT_TYPE: &str = "Session";

/// Lap number used when the dataset does not carry one
pub const DEFAULT_START_LAP: u32 = 1;

fn default_start_lap() -> u32 {
    DEFAULT_START_LAP
}

/// Time origin and calendar day of a session
///
/// The origin is the first timestamp of the dataset; the day is its date component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOrigin {
    /// First timestamp of the dataset
    pub time_origin: NaiveDateTime,

    /// Calendar day every timestamp belongs to
    pub day: NaiveDate,
}

impl SessionOrigin {
    /// Creates an origin, deriving the day from the timestamp
    pub fn new(time_origin: NaiveDateTime) -> Self {
        Self {
            time_origin,
            day: time_origin.date(),
        }
    }

    /// Offset of `ts` from the origin in nanoseconds, `None` if it precedes it
    pub fn offset_of(&self, ts: &NaiveDateTime) -> Option<u64> {
        offset_nanos(&self.time_origin, ts)
    }

    /// Nanoseconds between midnight of the session day and the origin
    pub fn origin_nanos_since_midnight(&self) -> u64 {
        nanos_since_midnight(&self.time_origin)
    }
}

/// Everything a sink needs to open a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Human readable session identifier
    pub identifier: String,

    /// Event type recorded with the session
    pub event_type: String,

    /// Time origin and day
    pub origin: SessionOrigin,

    /// Lap the session starts in, marked at the time origin
    #[serde(default = "default_start_lap")]
    pub start_lap: u32,
}

impl SessionRequest {
    /// Creates a request with the default event type and start lap
    pub fn new(identifier: impl Into<String>, origin: SessionOrigin) -> Self {
        Self {
            identifier: identifier.into(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            origin,
            start_lap: DEFAULT_START_LAP,
        }
    }

    /// Sets the lap the session starts in
    pub fn with_start_lap(mut self, lap: u32) -> Self {
        self.start_lap = lap;
        self
    }

    /// Display name of the start lap, e.g. `"Lap 3"`
    pub fn start_lap_name(&self) -> String {
        format!("Lap {}", self.start_lap)
    }
}

/// Open session, returned by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Identity assigned by the sink
    pub key: SessionKey,

    /// Identifier the session was created with
    pub identifier: String,
}

/// Channel inside an open session, returned by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    /// Owning session
    pub session: SessionKey,

    /// Sink-assigned channel id, unique within the session
    pub channel_id: u32,

    /// Channel name
    pub name: ChannelName,
}

/// Channel identity derived from one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Position of the source column, also the channel index in write order
    pub position: usize,

    /// Channel name, the column label verbatim
    pub name: ChannelName,

    /// Parent application group
    pub group: String,
}

impl ChannelSpec {
    /// Store-level parameter identifier, `"{name}:{group}"`
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.name, self.group)
    }
}

/// One `(offset, value)` pair of a channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Nanoseconds since the session time origin
    pub offset_ns: u64,

    /// Sample value
    pub value: f64,
}

impl Sample {
    /// Creates a sample
    pub fn new(offset_ns: u64, value: f64) -> Self {
        Self { offset_ns, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> SessionOrigin {
        SessionOrigin::new(
            NaiveDate::from_ymd_opt(2021, 1, 1)
                .unwrap()
                .and_hms_opt(10, 10, 10)
                .unwrap(),
        )
    }

    #[test]
    fn test_origin_derives_day() {
        let origin = origin();
        assert_eq!(origin.day, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(origin.origin_nanos_since_midnight(), 36_610_000_000_000);
    }

    #[test]
    fn test_origin_offset_of() {
        let origin = origin();
        let later = origin.time_origin + chrono::Duration::seconds(2);
        let earlier = origin.time_origin - chrono::Duration::seconds(2);
        assert_eq!(origin.offset_of(&later), Some(2_000_000_000));
        assert_eq!(origin.offset_of(&earlier), None);
    }

    #[test]
    fn test_session_request_default_event_type() {
        let request = SessionRequest::new("Run 12", origin());
        assert_eq!(request.event_type, "Session");
        assert_eq!(request.identifier, "Run 12");
        assert_eq!(request.start_lap, 1);
        assert_eq!(request.with_start_lap(3).start_lap_name(), "Lap 3");
    }

    #[test]
    fn test_session_request_start_lap_defaults_when_absent() {
        let mut json = serde_json::to_value(SessionRequest::new("Run 12", origin())).unwrap();
        json.as_object_mut().unwrap().remove("start_lap");
        let request: SessionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.start_lap, DEFAULT_START_LAP);
    }

    #[test]
    fn test_channel_spec_identifier() {
        let spec = ChannelSpec {
            position: 0,
            name: ChannelName::new("Param 1").unwrap(),
            group: "SessionFrame".to_string(),
        };
        assert_eq!(spec.identifier(), "Param 1:SessionFrame");
    }
}
