//! Message entries.
//!
//! An [`Entry`] is one record from a `raw_messages` list: the application
//! message body plus the envelope the bus attached to it on delivery.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::timestamp::{datetime_from_epoch_secs, epoch_secs_from_datetime, parse_epoch_secs};
use crate::error::CoreError;

// ============================================================================
// Entry
// ============================================================================

/// A decoded message record.
///
/// The message body is the entry's key/value surface: [`Entry::get`],
/// [`Entry::keys`] and iteration all operate on the `msg` object. Envelope
/// fields are reached through dedicated accessors.
///
/// Entries are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Entry {
    certificate: String,
    signature: String,
    #[serde(rename = "i")]
    index: u64,
    #[serde(serialize_with = "serialize_epoch_secs")]
    timestamp: DateTime<Utc>,
    topic: String,
    #[serde(rename = "msg")]
    message: Map<String, Value>,
    meta: Map<String, Value>,
}

impl Entry {
    /// Builds an entry from one decoded JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if `certificate`, `signature`,
    /// `i`, `timestamp`, `topic` or `msg` is absent, and
    /// [`CoreError::InvalidData`] if any field has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut record) = value else {
            return Err(CoreError::InvalidData(format!(
                "record must be a JSON object, got {}",
                kind_of(&value)
            )));
        };

        let certificate = take_string(&mut record, "certificate")?;
        let signature = take_string(&mut record, "signature")?;

        let raw_index = take_required(&mut record, "i")?;
        let index = raw_index.as_u64().ok_or_else(|| {
            CoreError::InvalidData(format!("i must be a non-negative integer, got {raw_index}"))
        })?;

        let raw_timestamp = take_required(&mut record, "timestamp")?;
        let timestamp = datetime_from_epoch_secs(parse_epoch_secs(&raw_timestamp)?)?;

        let topic = take_string(&mut record, "topic")?;
        let message = match take_required(&mut record, "msg")? {
            Value::Object(map) => map,
            other => {
                return Err(CoreError::InvalidData(format!(
                    "msg must be an object, got {}",
                    kind_of(&other)
                )));
            }
        };

        let meta = match record.remove("meta") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(CoreError::InvalidData(format!(
                    "meta must be an object, got {}",
                    kind_of(&other)
                )));
            }
        };

        Ok(Self {
            certificate,
            signature,
            index,
            timestamp,
            topic,
            message,
            meta,
        })
    }

    /// Looks up a message body field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the body has no such key.
    pub fn get(&self, key: &str) -> Result<&Value, CoreError> {
        self.message
            .get(key)
            .ok_or_else(|| CoreError::KeyNotFound(key.to_string()))
    }

    /// Looks up a message body field, returning `None` if absent.
    pub fn try_get(&self, key: &str) -> Option<&Value> {
        self.message.get(key)
    }

    /// Returns true if the message body has the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.message.contains_key(key)
    }

    /// Iterates over message body keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.message.keys()
    }

    /// Iterates over message body values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.message.values()
    }

    /// Iterates over message body key/value pairs.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.message.iter()
    }

    /// Number of keys in the message body.
    pub fn len(&self) -> usize {
        self.message.len()
    }

    /// Returns true if the message body is empty.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Delivery certificate, passed through verbatim.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    /// Delivery signature, passed through verbatim.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Envelope metadata; empty when the server sent none.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Server-assigned sequence number.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// When the message was published.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Dotted topic the message was published on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The whole message body.
    pub fn message(&self) -> &Map<String, Value> {
        &self.message
    }
}

impl TryFrom<Value> for Entry {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl<'a> IntoIterator for &'a Entry {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.message.iter()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = serde_json::to_string(&self.message).map_err(|_| fmt::Error)?;
        write!(
            f,
            "<Entry[{} -- {} @ {}] {}>",
            self.topic, self.index, self.timestamp, body
        )
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn take_required(record: &mut Map<String, Value>, field: &'static str) -> Result<Value, CoreError> {
    record.remove(field).ok_or(CoreError::MissingField(field))
}

fn take_string(record: &mut Map<String, Value>, field: &'static str) -> Result<String, CoreError> {
    match take_required(record, field)? {
        Value::String(s) => Ok(s),
        other => Err(CoreError::InvalidData(format!(
            "{field} must be a string, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn serialize_epoch_secs<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(epoch_secs_from_datetime(timestamp))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "certificate": "C",
            "signature": "S",
            "i": 1,
            "timestamp": "1370967851",
            "topic": "t",
            "msg": {"user": "sross"}
        })
    }

    #[test]
    fn test_basic_data_parsing() {
        let entry = Entry::from_value(sample()).unwrap();

        assert_eq!(entry.certificate(), "C");
        assert_eq!(entry.signature(), "S");
        assert_eq!(entry.index(), 1);
        assert_eq!(entry.topic(), "t");
        assert!(entry.meta().is_empty());
        assert_eq!(
            entry.timestamp(),
            Utc.timestamp_opt(1_370_967_851, 0).unwrap()
        );
    }

    #[test]
    fn test_message_access() {
        let entry = Entry::from_value(sample()).unwrap();
        assert_eq!(entry.get("user").unwrap(), "sross");
        assert_eq!(entry.len(), 1);
        assert!(!entry.is_empty());
        assert!(entry.contains_key("user"));
        assert_eq!(entry.keys().collect::<Vec<_>>(), vec!["user"]);
    }

    #[test]
    fn test_strict_lookup_fails_on_missing_key() {
        let entry = Entry::from_value(sample()).unwrap();
        assert!(matches!(
            entry.get("agent"),
            Err(CoreError::KeyNotFound(key)) if key == "agent"
        ));
        assert!(entry.try_get("agent").is_none());
    }

    #[test]
    fn test_meta_added_when_present() {
        let mut record = sample();
        record["meta"] = json!({"title": "fas.user.create"});
        let entry = Entry::from_value(record).unwrap();
        assert_eq!(entry.meta()["title"], "fas.user.create");
    }

    #[test]
    fn test_null_meta_is_empty() {
        let mut record = sample();
        record["meta"] = Value::Null;
        let entry = Entry::from_value(record).unwrap();
        assert!(entry.meta().is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        for field in ["certificate", "signature", "i", "timestamp", "topic", "msg"] {
            let mut record = sample();
            record.as_object_mut().unwrap().remove(field);
            match Entry::from_value(record) {
                Err(CoreError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_msg_must_be_object() {
        let mut record = sample();
        record["msg"] = json!(["not", "a", "map"]);
        assert!(matches!(
            Entry::from_value(record),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut record = sample();
        record["i"] = json!(-3);
        assert!(matches!(
            Entry::from_value(record),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_non_object_record_rejected() {
        assert!(matches!(
            Entry::from_value(json!("hello")),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_fractional_numeric_timestamp() {
        let mut record = sample();
        record["timestamp"] = json!(1_370_967_851.25);
        let entry = Entry::from_value(record).unwrap();
        assert_eq!(entry.timestamp().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_display() {
        let entry = Entry::from_value(sample()).unwrap();
        assert_eq!(
            entry.to_string(),
            r#"<Entry[t -- 1 @ 2013-06-11 16:24:11 UTC] {"user":"sross"}>"#
        );
    }

    #[test]
    fn test_iterate_body() {
        let mut record = sample();
        record["msg"] = json!({"a": 1, "b": 2});
        let entry = Entry::from_value(record).unwrap();

        let mut seen: Vec<_> = (&entry).into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        seen.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(seen, vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))]);
    }
}
