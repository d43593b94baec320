//! Core error types for `datanozzle`.

use thiserror::Error;

/// Core error type for entry decoding and lookup.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required envelope field is absent from a record.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A record field is present but has the wrong shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Strict lookup of a message body key that does not exist.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true if this error came from a malformed record rather than a lookup.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CoreError::MissingField(_) | CoreError::InvalidData(_) | CoreError::Serialization(_)
        )
    }
}
