//! Fetch error types.

use datanozzle_core::CoreError;
use thiserror::Error;

/// Error type for query building and page fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL, without query string.
        url: String,
    },

    /// A page body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record could not be turned into an entry.
    #[error("Entry error: {0}")]
    Core(#[from] CoreError),

    /// A builder method was called with an unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `reset` named a parameter that is not set.
    #[error("Parameter not set: {0}")]
    ParamNotSet(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),
}

impl FetchError {
    /// Returns true if the failure happened while talking to the server.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Http(_) | FetchError::UnexpectedStatus { .. } | FetchError::DomainNotAllowed(_)
        )
    }

    /// Returns true if the server answered but the body could not be decoded.
    pub fn is_response_format(&self) -> bool {
        match self {
            FetchError::InvalidResponse(_) | FetchError::Json(_) => true,
            FetchError::Core(e) => e.is_decode_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_bad_json_is_not_a_transport_failure() {
        let err = FetchError::from(serde_json::from_str::<Value>("<html>").unwrap_err());
        assert!(err.is_response_format());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_status_is_transport_failure() {
        let err = FetchError::UnexpectedStatus {
            status: 502,
            url: "https://dg.example.org/raw".to_string(),
        };
        assert!(err.is_transport());
        assert!(!err.is_response_format());
    }

    #[test]
    fn test_decode_errors_from_entries_are_response_format() {
        let err = FetchError::from(CoreError::MissingField("topic"));
        assert!(err.is_response_format());

        let err = FetchError::from(CoreError::KeyNotFound("x".to_string()));
        assert!(!err.is_response_format());
    }
}
