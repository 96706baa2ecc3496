//! # Notification Parser
//!
//! Pure decoding of a raw queue message body into trigger records.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::ParseError;
use super::notification::{RawRecord, TriggerRecord};
use crate::constants::notifications;

/// Decode a message body into zero or more trigger records
///
/// - Not a JSON object: `MalformedBody`
/// - Connectivity probe (`Service` + `Event` fields with a test event type): empty
/// - Otherwise a `Records`/`records` array is required; an empty array is fine
/// - Any record missing its bucket name or object key fails the whole message
pub fn parse(body: &str) -> Result<Vec<TriggerRecord>, ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::malformed_body("empty message body"));
    }

    let value: Value = serde_json::from_str(body)?;
    let Value::Object(event) = value else {
        return Err(ParseError::malformed_body("body is not a JSON object"));
    };

    if is_probe_event(&event) {
        return Ok(Vec::new());
    }

    let records = field(&event, notifications::RECORDS_FIELDS)
        .ok_or_else(|| ParseError::malformed_body("missing records field"))?
        .as_array()
        .ok_or_else(|| ParseError::malformed_body("records field is not an array"))?;

    records
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_record(index, entry))
        .collect()
}

/// Whether the body is a storage-service connectivity probe
pub fn is_probe_event(event: &Map<String, Value>) -> bool {
    let has_service = field(event, notifications::SERVICE_FIELDS).is_some();
    let event_type = field(event, notifications::EVENT_FIELDS).and_then(Value::as_str);

    match (has_service, event_type) {
        (true, Some(event_type)) => notifications::PROBE_EVENT_TYPES.contains(&event_type),
        _ => false,
    }
}

fn field<'a>(event: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| event.get(*name))
}

fn parse_record(index: usize, entry: &Value) -> Result<TriggerRecord, ParseError> {
    let raw = RawRecord::deserialize(entry)
        .map_err(|e| ParseError::malformed_record(index, e.to_string()))?;

    let bucket_name = raw.s3.bucket.name;
    if bucket_name.is_empty() {
        return Err(ParseError::malformed_record(index, "empty bucket name"));
    }

    let object_key = raw.s3.object.key;
    if object_key.is_empty() {
        return Err(ParseError::malformed_record(index, "empty object key"));
    }

    Ok(TriggerRecord {
        bucket_name,
        object_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> String {
        value.to_string()
    }

    #[test]
    fn test_single_record() {
        let records =
            parse(r#"{"records":[{"s3":{"bucket":{"name":"b1"},"object":{"key":"k1"}}}]}"#)
                .unwrap();
        assert_eq!(records, vec![TriggerRecord::new("b1", "k1")]);
    }

    #[test]
    fn test_records_keep_body_order() {
        let records = parse(&body(json!({
            "Records": [
                {"s3": {"bucket": {"name": "b1"}, "object": {"key": "k1"}}},
                {"s3": {"bucket": {"name": "b2"}, "object": {"key": "k2"}}},
                {"source": {"bucket": {"name": "b3"}, "object": {"key": "k3"}}}
            ]
        })))
        .unwrap();

        let keys: Vec<_> = records.iter().map(|r| r.object_key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn test_storage_probe_is_ignored() {
        let records = parse(&body(json!({
            "Service": "Amazon S3",
            "Event": "s3:TestEvent",
            "Time": "2024-01-01T00:00:00.000Z",
            "Bucket": "uploads"
        })))
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_connectivity_probe_is_ignored() {
        let records = parse(&body(json!({"service": "storage", "event": "connectivity-test"})))
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_probe_event_type_requires_records() {
        let err = parse(&body(json!({"Service": "Amazon S3", "Event": "s3:ObjectCreated:Put"})))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedBody { .. }));
    }

    #[test]
    fn test_malformed_bodies() {
        for raw in ["", "   ", "not json", "[1,2]", "42", r#"{"records": {}}"#, "{}"] {
            let err = parse(raw).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedBody { .. }),
                "expected MalformedBody for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_one_bad_record_fails_whole_message() {
        let err = parse(&body(json!({
            "records": [
                {"s3": {"bucket": {"name": "b1"}, "object": {"key": "k1"}}},
                {"s3": {"bucket": {"name": "b2"}}}
            ]
        })))
        .unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn test_empty_bucket_name_is_malformed() {
        let err = parse(&body(json!({
            "records": [{"s3": {"bucket": {"name": ""}, "object": {"key": "k1"}}}]
        })))
        .unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn test_empty_records_array() {
        assert!(parse(r#"{"Records": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_object_key_is_forwarded_verbatim() {
        for key in ["a+b.mp4", "100%+done.mp4", "my+video%2Fpart%201.mp4", "%FF%FE"] {
            let records = parse(&body(json!({
                "Records": [{"s3": {"bucket": {"name": "b"}, "object": {"key": key}}}]
            })))
            .unwrap();
            assert_eq!(records[0].object_key, key);
        }
    }
}
