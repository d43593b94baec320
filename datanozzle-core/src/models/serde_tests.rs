//! Serde tests for entries.
//!
//! Entries serialize back into the wire shape so that they can be re-read by
//! anything that understands `raw_messages` records.

use serde_json::json;

use crate::Entry;

fn record() -> serde_json::Value {
    json!({
        "certificate": "some_certificate",
        "signature": "some_signature",
        "i": 7,
        "timestamp": 1_371_144_251.5,
        "topic": "org.fedoraproject.prod.fas.user.create",
        "msg": {"user": "sross", "agent": "ralph"},
        "meta": {"title": "fas.user.create"}
    })
}

#[test]
fn test_entry_serializes_to_wire_names() {
    let entry = Entry::from_value(record()).unwrap();
    let value = serde_json::to_value(&entry).unwrap();

    assert_eq!(value["i"], 7);
    assert_eq!(value["msg"]["user"], "sross");
    assert_eq!(value["meta"]["title"], "fas.user.create");
    assert_eq!(value["timestamp"], 1_371_144_251.5);
    assert!(value.get("index").is_none());
    assert!(value.get("message").is_none());
}

#[test]
fn test_entry_serde_roundtrip() {
    let entry = Entry::from_value(record()).unwrap();
    let json = serde_json::to_string(&entry).unwrap();
    let parsed: Entry = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, entry);
}

#[test]
fn test_deserialize_reports_missing_field() {
    let result: Result<Entry, _> = serde_json::from_value(json!({
        "certificate": "C",
        "signature": "S",
        "i": 1,
        "timestamp": 0,
        "msg": {}
    }));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("topic"), "unexpected error: {err}");
}

#[test]
fn test_deserialize_string_timestamp() {
    let mut value = record();
    value["timestamp"] = json!("1371144251");
    let entry: Entry = serde_json::from_value(value).unwrap();
    assert_eq!(entry.timestamp().timestamp(), 1_371_144_251);
}
