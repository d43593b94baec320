//! Integration tests for entry decoding.

use chrono::{TimeZone, Utc};
use datanozzle_core::{CoreError, Entry};
use serde_json::json;

#[test]
fn test_sample_record_roundtrip() {
    let entry = Entry::from_value(json!({
        "certificate": "C",
        "signature": "S",
        "i": 1,
        "timestamp": "1370967851",
        "topic": "t",
        "msg": {"user": "sross"}
    }))
    .unwrap();

    assert_eq!(entry.index(), 1);
    assert_eq!(entry.topic(), "t");
    assert!(entry.meta().is_empty());
    assert_eq!(entry.timestamp(), Utc.timestamp_opt(1_370_967_851, 0).unwrap());
    assert_eq!(entry.get("user").unwrap(), "sross");
}

#[test]
fn test_missing_field_is_decode_error() {
    let err = Entry::from_value(json!({"certificate": "C"})).unwrap_err();
    assert!(err.is_decode_error());
    assert!(matches!(err, CoreError::MissingField("signature")));
}

#[test]
fn test_key_lookup_is_not_decode_error() {
    let entry = Entry::try_from(json!({
        "certificate": "C",
        "signature": "S",
        "i": 2,
        "timestamp": 0,
        "topic": "t",
        "msg": {}
    }))
    .unwrap();

    let err = entry.get("user").unwrap_err();
    assert!(!err.is_decode_error());
    assert_eq!(err.to_string(), "Key not found: user");
}
