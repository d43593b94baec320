//! Configuration management.

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};
use datanozzle_fetch::{DEFAULT_BASE_URL, HttpTransport, QueryBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API root queries are sent to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rows per page applied to every new query.
    #[serde(default)]
    pub rows_per_page: Option<u32>,
    /// Hosts requests may go to; unrestricted when absent.
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            rows_per_page: None,
            allowed_domains: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&default_config_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let config: Config = match load_json(path) {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> Result<(), StoreError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be positive".to_string()));
        }

        if self.rows_per_page == Some(0) {
            return Err(StoreError::Config("rows_per_page must be positive".to_string()));
        }

        Ok(())
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the HTTP transport described by this configuration.
    pub fn transport(&self) -> Result<HttpTransport, StoreError> {
        let transport = HttpTransport::with_timeout(self.timeout())?;

        Ok(match &self.allowed_domains {
            Some(domains) => transport.with_allowed_domains(domains.clone()),
            None => transport,
        })
    }

    /// Starts a query with this configuration's root, transport and page size.
    pub fn query(&self) -> Result<QueryBuilder, StoreError> {
        let query = QueryBuilder::with_base_url(&self.base_url).with_transport(self.transport()?);

        Ok(match self.rows_per_page {
            Some(rows) => query.paginate(rows),
            None => query,
        })
    }
}
