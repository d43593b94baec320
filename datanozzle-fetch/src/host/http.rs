//! HTTP transport with tracing and domain allowlist.
//!
//! The query builder never talks to reqwest directly. It hands a URL and a
//! list of query pairs to a [`Transport`], which performs one blocking GET
//! and returns the decoded JSON body. [`HttpTransport`] is the production
//! implementation; tests substitute an in-memory one.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for datanozzle.
const USER_AGENT: &str = concat!("datanozzle/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport
// ============================================================================

/// Performs a single GET request and decodes the body as JSON.
///
/// Implementations must not retry; failures are returned to the caller as-is.
pub trait Transport: Send + Sync {
    /// Issues `GET url?query` and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails, the server answers
    /// with a non-success status, or the body is not JSON.
    fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, FetchError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        (**self).get_json(url, query)
    }
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// Blocking reqwest transport with tracing and an optional domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpTransport {
    /// Creates a new transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new transport with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying client cannot be built,
    /// which usually means a broken TLS configuration.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), FetchError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(FetchError::DomainNotAllowed(host.to_string()))
        }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, query), fields(url = %url))]
    fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        self.is_domain_allowed(url)?;
        debug!(params = query.len(), "GET request");

        let response = self.inner.get(url).query(query).send()?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        decode_body(&response.bytes()?)
    }
}

/// Decodes a success body. A body that is not JSON is a response-format error.
fn decode_body(body: &[u8]) -> Result<Value, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

/// Returns the process-wide default transport, building it on first use.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the client cannot be built. The next call
/// tries again.
pub fn default_transport() -> Result<Arc<dyn Transport>, FetchError> {
    static DEFAULT: OnceLock<Arc<HttpTransport>> = OnceLock::new();

    if let Some(transport) = DEFAULT.get() {
        return Ok(Arc::clone(transport) as Arc<dyn Transport>);
    }

    let built = Arc::new(HttpTransport::new()?);
    let transport = DEFAULT.get_or_init(|| built);
    Ok(Arc::clone(transport) as Arc<dyn Transport>)
}

// ============================================================================
// Tests
// ============================================================================
