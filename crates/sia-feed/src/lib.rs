//! Boundary adapter for the upstream notification log.
//!
//! The backend hands us loosely shaped JSON: ids arrive as numbers or
//! strings, `payload` may be an object, a JSON-encoded string, null or
//! absent, and timestamps come in more than one format. Everything here
//! is best effort: a malformed payload decodes to an empty one and a bad
//! timestamp becomes "missing", so a single dirty record can never sink
//! the reconciliation pass.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sia_core::{EventPayload, NotificationEvent};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid notification snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// One record as received from the upstream log, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNotificationRecord {
    #[serde(deserialize_with = "deserialize_id_u64")]
    pub id: u64,
    #[serde(rename = "recipientId", deserialize_with = "deserialize_id")]
    pub recipient_id: String,
    #[serde(default, rename = "recipientName")]
    pub recipient_name: String,
    #[serde(default, rename = "recipientRole")]
    pub recipient_role: String,
    #[serde(default, rename = "recipientCategory")]
    pub recipient_category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "isRead")]
    pub is_read: bool,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Decodes a full snapshot (a JSON array of records). Only the outer
/// parse can fail; per-record payload and timestamp problems degrade to
/// defaults instead of propagating.
pub fn decode_snapshot(text: &str) -> Result<Vec<NotificationEvent>, FeedError> {
    let records: Vec<RawNotificationRecord> = serde_json::from_str(text)?;
    Ok(records.into_iter().map(decode_event).collect())
}

pub fn decode_event(raw: RawNotificationRecord) -> NotificationEvent {
    let payload = decode_payload(raw.id, raw.payload);
    let created_at = raw.created_at.as_deref().and_then(|text| {
        let parsed = parse_timestamp(text);
        if parsed.is_none() {
            warn!(event_id = raw.id, created_at = text, "unparsable timestamp, treating as missing");
        }
        parsed
    });
    NotificationEvent {
        id: raw.id,
        recipient_id: raw.recipient_id,
        recipient_name: raw.recipient_name,
        recipient_role: raw.recipient_role,
        recipient_category: raw.recipient_category,
        title: raw.title,
        message: raw.message,
        created_at,
        is_read: raw.is_read,
        payload,
    }
}

fn decode_payload(event_id: u64, raw: Option<Value>) -> EventPayload {
    let value = match raw {
        None | Some(Value::Null) => return EventPayload::default(),
        // Some upstream writers store the payload as a JSON-encoded string.
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(inner) => inner,
            Err(err) => {
                warn!(event_id, %err, "payload string is not valid JSON, substituting empty payload");
                return EventPayload::default();
            }
        },
        Some(other) => other,
    };
    match serde_json::from_value::<EventPayload>(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(event_id, %err, "malformed payload, substituting empty payload");
            EventPayload::default()
        }
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("expected string or number for id")),
    }
}

fn deserialize_id_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => s.parse::<u64>().map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("invalid u64")),
        _ => Err(serde::de::Error::custom("expected string or number for id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sia_core::ScheduleType;

    #[test]
    fn decodes_object_payload_and_space_separated_timestamp() {
        let events = decode_snapshot(
            r#"[{
                "id": "7",
                "recipientId": 12,
                "recipientName": "Dr. A",
                "recipientCategory": "lecturer",
                "title": "Konfirmasi Ketersediaan",
                "createdAt": "2026-03-02 09:30:00",
                "payload": {"scheduleType": "pbl", "scheduleId": 31}
            }]"#,
        )
        .expect("snapshot decodes");
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, 7);
        assert_eq!(event.recipient_id, "12");
        assert_eq!(event.payload.schedule_type, Some(ScheduleType::Pbl));
        assert_eq!(event.payload.schedule_id.as_deref(), Some("31"));
        assert!(event.created_at.is_some());
    }

    #[test]
    fn decodes_json_encoded_string_payload() {
        let events = decode_snapshot(
            r#"[{
                "id": 1,
                "recipientId": "u-1",
                "createdAt": "2026-03-02T09:30:00Z",
                "payload": "{\"statusKonfirmasi\": \"tidak_bisa\"}"
            }]"#,
        )
        .expect("snapshot decodes");
        assert_eq!(
            events[0].payload.status_konfirmasi.as_deref(),
            Some("tidak_bisa")
        );
    }

    #[test]
    fn malformed_payload_degrades_to_empty() {
        let events = decode_snapshot(
            r#"[{
                "id": 1,
                "recipientId": "u-1",
                "payload": "{not json"
            }]"#,
        )
        .expect("snapshot decodes");
        assert_eq!(events[0].payload, EventPayload::default());

        let events = decode_snapshot(
            r#"[{
                "id": 2,
                "recipientId": "u-1",
                "payload": 17
            }]"#,
        )
        .expect("snapshot decodes");
        assert_eq!(events[0].payload, EventPayload::default());
    }

    #[test]
    fn unparsable_timestamp_becomes_missing() {
        let events = decode_snapshot(
            r#"[{
                "id": 1,
                "recipientId": "u-1",
                "createdAt": "yesterday-ish"
            }]"#,
        )
        .expect("snapshot decodes");
        assert_eq!(events[0].created_at, None);
    }

    #[test]
    fn broken_snapshot_is_an_error() {
        assert!(decode_snapshot("{\"not\": \"an array\"}").is_err());
    }
}
