//! Accelerometer sample records as delivered by the sensor backend.
//!
//! The backend is loose about its wire format: ids come back as strings
//! (document ids) or integers, the id key is `_id` on the bulk endpoint and
//! `id` on the stream, and timestamps may be RFC 3339, naive local time, or
//! epoch milliseconds. All of those decode into one [`Sample`].

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FeedError;

/// Naive timestamp layouts, interpreted in the local timezone.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Opaque sample identifier, used only for row identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleId::Number(n) => write!(f, "{}", n),
            SampleId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SampleId {
    fn from(n: i64) -> Self {
        SampleId::Number(n)
    }
}

impl From<&str> for SampleId {
    fn from(s: &str) -> Self {
        SampleId::Text(s.to_string())
    }
}

/// One timestamped 3-axis accelerometer reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(alias = "_id")]
    pub id: SampleId,

    /// When the reading was recorded. Older backend builds omit it.
    #[serde(
        rename = "created_at",
        alias = "timestamp",
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(
        id: impl Into<SampleId>,
        timestamp: Option<DateTime<Utc>>,
        x: f64,
        y: f64,
        z: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            x,
            y,
            z,
        }
    }

    /// Decode one stream message.
    pub fn from_message(raw: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(raw.trim())?)
    }

    /// Local time-of-day label, e.g. "10:30:05 AM". Empty when the
    /// sample carries no timestamp.
    pub fn time_of_day(&self) -> String {
        self.timestamp.map(format_time_of_day).unwrap_or_default()
    }
}

/// Format an instant as a local time-of-day label.
pub fn format_time_of_day(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%-I:%M:%S %p").to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FloatMillis(f64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    let parsed = match raw {
        None => return Ok(None),
        Some(RawTimestamp::Millis(ms)) => DateTime::from_timestamp_millis(ms),
        Some(RawTimestamp::FloatMillis(ms)) => DateTime::from_timestamp_millis(ms as i64),
        Some(RawTimestamp::Text(s)) => parse_timestamp(&s),
    };
    parsed
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("invalid timestamp"))
}

/// Parse an RFC 3339 timestamp, falling back to naive local time.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(s, fmt).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stream_message() {
        let sample = Sample::from_message(
            r#"{"id":"6543a1","created_at":"2025-10-27T10:30:05.123Z","x":12.5,"y":-980,"z":3}"#,
        )
        .unwrap();
        assert_eq!(sample.id, SampleId::Text("6543a1".to_string()));
        assert_eq!(sample.x, 12.5);
        assert_eq!(sample.y, -980.0);
        assert_eq!(
            sample.timestamp.unwrap(),
            DateTime::parse_from_rfc3339("2025-10-27T10:30:05.123Z").unwrap()
        );
    }

    #[test]
    fn test_decode_bulk_record_with_underscore_id() {
        let sample: Sample = serde_json::from_str(r#"{"_id":"abc","x":1,"y":2,"z":3}"#).unwrap();
        assert_eq!(sample.id.to_string(), "abc");
        assert!(sample.timestamp.is_none());
        assert_eq!(sample.time_of_day(), "");
    }

    #[test]
    fn test_decode_numeric_id_and_epoch_millis() {
        let sample: Sample =
            serde_json::from_str(r#"{"id":3,"timestamp":1761561005000,"x":0,"y":0,"z":0}"#)
                .unwrap();
        assert_eq!(sample.id, SampleId::Number(3));
        assert_eq!(sample.timestamp.unwrap().timestamp_millis(), 1_761_561_005_000);
    }

    #[test]
    fn test_naive_timestamp_is_local_time() {
        let sample: Sample = serde_json::from_str(
            r#"{"id":1,"created_at":"2025-10-27T10:30:05.123456","x":0,"y":0,"z":0}"#,
        )
        .unwrap();
        assert_eq!(sample.time_of_day(), "10:30:05 AM");
    }

    #[test]
    fn test_naive_timestamp_without_fraction() {
        let ts = parse_timestamp("2025-10-27 22:01:00").unwrap();
        assert_eq!(format_time_of_day(ts), "10:01:00 PM");
    }

    #[test]
    fn test_rejects_non_json() {
        let err = Sample::from_message("hello world").unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_rejects_missing_axis() {
        assert!(Sample::from_message(r#"{"id":1,"x":1,"y":2}"#).is_err());
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        assert!(
            Sample::from_message(r#"{"id":1,"created_at":"yesterday","x":1,"y":2,"z":3}"#).is_err()
        );
    }

    #[test]
    fn test_serialize_uses_backend_field_names() {
        let sample = Sample::new(7, None, 1.0, 2.0, 3.0);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json.get("created_at").is_none());
    }
}
