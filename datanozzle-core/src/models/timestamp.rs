//! Epoch-second conversions.
//!
//! The wire format carries timestamps as seconds since the Unix epoch, either
//! as a JSON number or as a numeric string, with an optional fractional part.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::CoreError;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Reads a JSON number or numeric string as epoch seconds.
///
/// # Errors
///
/// Returns [`CoreError::InvalidData`] if the value is neither a number nor a
/// string holding a finite number.
pub fn parse_epoch_secs(value: &Value) -> Result<f64, CoreError> {
    let secs = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoreError::InvalidData(format!("timestamp out of range: {n}")))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| CoreError::InvalidData(format!("timestamp {s:?}: {e}")))?,
        other => {
            return Err(CoreError::InvalidData(format!(
                "timestamp must be a number or numeric string, got {other}"
            )));
        }
    };

    if secs.is_finite() {
        Ok(secs)
    } else {
        Err(CoreError::InvalidData(format!("timestamp is not finite: {secs}")))
    }
}

/// Converts epoch seconds (fractional allowed) into a UTC instant.
///
/// # Errors
///
/// Returns [`CoreError::InvalidData`] for non-finite input or for values
/// outside the range chrono can represent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn datetime_from_epoch_secs(secs: f64) -> Result<DateTime<Utc>, CoreError> {
    if !secs.is_finite() {
        return Err(CoreError::InvalidData(format!("timestamp is not finite: {secs}")));
    }

    let whole = secs.floor();
    let mut seconds = whole as i64;
    let mut nanos = ((secs - whole) * NANOS_PER_SEC).round() as u32;
    if nanos >= 1_000_000_000 {
        seconds += 1;
        nanos = 0;
    }

    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| CoreError::InvalidData(format!("timestamp out of range: {secs}")))
}

/// Converts a UTC instant into epoch seconds.
#[allow(clippy::cast_precision_loss)]
pub fn epoch_secs_from_datetime(instant: &DateTime<Utc>) -> f64 {
    instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / NANOS_PER_SEC
}
