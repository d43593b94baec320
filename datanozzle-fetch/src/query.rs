//! The immutable query builder.
//!
//! Every configuration method borrows the receiver and returns a new
//! [`QueryBuilder`] with its own copy of the parameters, so a builder can be
//! used as the common ancestor of many independent queries:
//!
//! ```
//! use datanozzle_fetch::QueryBuilder;
//!
//! let base = QueryBuilder::new().by_topic(["org.fedoraproject.prod.git.receive"]);
//! let mine = base.by_user("sross");
//! let theirs = base.by_user("ralph");
//!
//! assert!(base.params().get("user").is_none());
//! assert_ne!(mine.params(), theirs.params());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use datanozzle_core::epoch_secs_from_datetime;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;
use crate::host::http::Transport;
use crate::pager::EntryStream;
use crate::params::{ParamValue, Params};

/// API root used when none is given.
pub const DEFAULT_BASE_URL: &str = "https://apps.fedoraproject.org/datagrepper/";

/// Endpoint, relative to the API root, that serves raw message pages.
const RAW_ENDPOINT: &str = "raw";

/// Logical name that clears the page limit in [`QueryBuilder::reset`].
const RESET_TAKE: &str = "take";

/// Logical names accepted by [`QueryBuilder::reset`] that differ from the
/// parameter key they control.
const RESET_ALIASES: &[(&str, &str)] = &[
    ("containing", "contains"),
    ("rows", "rows_per_page"),
    ("paginate", "rows_per_page"),
    ("skip", "page"),
    ("starting_at", "start"),
    ("ending_at", "end"),
    ("delta_seconds", "delta"),
];

/// Resolves a logical reset name to the parameter key it controls.
pub fn resolve_param_name(name: &str) -> &str {
    RESET_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, key)| *key)
}

// ============================================================================
// Sort Order
// ============================================================================

/// Result ordering by publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    /// Returns the wire value for this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(FetchError::InvalidArgument(format!(
                "unknown order {s:?}, expected asc or desc"
            ))),
        }
    }
}

// ============================================================================
// Time Bound
// ============================================================================

/// A point in time given either as raw epoch seconds or as an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeBound {
    /// Seconds since the Unix epoch.
    EpochSecs(f64),
    /// An absolute UTC instant.
    Instant(DateTime<Utc>),
}

impl TimeBound {
    /// Returns the bound as seconds since the Unix epoch.
    pub fn epoch_secs(&self) -> f64 {
        match self {
            Self::EpochSecs(secs) => *secs,
            Self::Instant(instant) => epoch_secs_from_datetime(instant),
        }
    }
}

impl From<f64> for TimeBound {
    fn from(secs: f64) -> Self {
        Self::EpochSecs(secs)
    }
}

impl From<i64> for TimeBound {
    #[allow(clippy::cast_precision_loss)]
    fn from(secs: i64) -> Self {
        Self::EpochSecs(secs as f64)
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

// ============================================================================
// Query Builder
// ============================================================================

/// An immutable, chainable datagrepper query.
///
/// Iterating a builder (through [`QueryBuilder::iter`] or `for entry in &q`)
/// walks the result pages and yields one
/// [`Entry`](datanozzle_core::Entry) per record. The builder itself never
/// changes, so iterating it again starts over with fresh requests.
#[derive(Clone)]
pub struct QueryBuilder {
    base_url: String,
    params: Params,
    page_limit: Option<u32>,
    /// `None` means the shared default transport, resolved when iterating.
    transport: Option<Arc<dyn Transport>>,
}

impl QueryBuilder {
    /// Creates a query against the default API root.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a query against a custom API root.
    ///
    /// The root is normalized to end in exactly one `/`.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            params: Params::new(),
            page_limit: None,
            transport: None,
        }
    }

    /// Returns a copy that sends its requests through `transport`.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(&self, transport: T) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Returns a copy that sends its requests through a shared transport.
    #[must_use]
    pub fn with_shared_transport(&self, transport: Arc<dyn Transport>) -> Self {
        let mut q = self.clone();
        q.transport = Some(transport);
        q
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// The normalized API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The accumulated query parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The page cap set by [`QueryBuilder::take`], if any.
    pub fn page_limit(&self) -> Option<u32> {
        self.page_limit
    }

    /// The URL every page request is sent to.
    pub fn request_url(&self) -> String {
        format!("{}{RAW_ENDPOINT}", self.base_url)
    }

    /// The parameters flattened into query-string pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params.to_query_pairs()
    }

    // ------------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------------

    /// Only messages involving this user. Replaces any earlier user.
    #[must_use]
    pub fn by_user(&self, user: impl Into<String>) -> Self {
        self.with_param("user", user.into())
    }

    /// Only messages involving any of these packages.
    #[must_use]
    pub fn by_package<I, S>(&self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("package", packages)
    }

    /// Only messages in any of these categories.
    #[must_use]
    pub fn by_category<I, S>(&self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("category", categories)
    }

    /// Only messages on any of these topics.
    #[must_use]
    pub fn by_topic<I, S>(&self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("topic", topics)
    }

    /// Only messages containing these substrings.
    #[must_use]
    pub fn containing<I, S>(&self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("contains", needles)
    }

    /// Exclude messages involving these users.
    #[must_use]
    pub fn without_user<I, S>(&self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("not_user", users)
    }

    /// Exclude messages involving these packages.
    #[must_use]
    pub fn without_package<I, S>(&self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("not_package", packages)
    }

    /// Exclude messages in these categories.
    #[must_use]
    pub fn without_category<I, S>(&self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("not_category", categories)
    }

    /// Exclude messages on these topics.
    #[must_use]
    pub fn without_topic<I, S>(&self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("not_topic", topics)
    }

    /// Ask the server to attach these metadata fields to each entry.
    #[must_use]
    pub fn with_meta<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_appended("meta", fields)
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// Oldest messages first.
    #[must_use]
    pub fn ascending(&self) -> Self {
        self.order(SortOrder::Asc)
    }

    /// Newest messages first.
    #[must_use]
    pub fn descending(&self) -> Self {
        self.order(SortOrder::Desc)
    }

    /// Sets the result order.
    #[must_use]
    pub fn order(&self, order: SortOrder) -> Self {
        self.with_param("order", order.as_str())
    }

    /// Ask the server to group related messages.
    #[must_use]
    pub fn grouped(&self) -> Self {
        self.with_param("grouped", "true")
    }

    /// Caps how many pages are walked.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidArgument`] if `pages` is `None`; there is
    /// no "take everything" form, use [`QueryBuilder::reset`] with `"take"`.
    pub fn take(&self, pages: impl Into<Option<u32>>) -> Result<Self, FetchError> {
        let Some(pages) = pages.into() else {
            return Err(FetchError::InvalidArgument(
                "You must specify a number of pages.".to_string(),
            ));
        };

        let mut q = self.clone();
        q.page_limit = Some(pages);
        Ok(q)
    }

    /// Skips the first `pages` pages. `None` skips nothing.
    #[must_use]
    pub fn skip(&self, pages: impl Into<Option<u32>>) -> Self {
        let first_page = u64::from(pages.into().unwrap_or(0)) + 1;
        self.with_param("page", first_page.to_string())
    }

    // ------------------------------------------------------------------------
    // Pagination & time window
    // ------------------------------------------------------------------------

    /// Number of messages per page.
    #[must_use]
    pub fn paginate(&self, rows_per_page: u32) -> Self {
        self.with_param("rows_per_page", rows_per_page.to_string())
    }

    /// Only messages published at or after `start`.
    #[must_use]
    pub fn starting_at(&self, start: impl Into<TimeBound>) -> Self {
        self.with_param("start", format_epoch_secs(start.into().epoch_secs()))
    }

    /// Only messages published at or before `end`.
    #[must_use]
    pub fn ending_at(&self, end: impl Into<TimeBound>) -> Self {
        self.with_param("end", format_epoch_secs(end.into().epoch_secs()))
    }

    /// Width of the time window in seconds.
    #[must_use]
    pub fn delta_seconds(&self, delta: u64) -> Self {
        self.with_param("delta", delta.to_string())
    }

    // ------------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------------

    /// Undoes an earlier configuration call by name.
    ///
    /// `"take"` clears the page limit. Any other name is resolved through
    /// the alias table (`containing`, `rows`, `paginate`, `skip`,
    /// `starting_at`, `ending_at`, `delta_seconds`) or used as the parameter
    /// key verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ParamNotSet`] if the resolved key is not set.
    pub fn reset(&self, name: &str) -> Result<Self, FetchError> {
        let mut q = self.clone();
        if name == RESET_TAKE {
            q.page_limit = None;
            return Ok(q);
        }

        let key = resolve_param_name(name);
        q.params
            .remove(key)
            .ok_or_else(|| FetchError::ParamNotSet(key.to_string()))?;
        Ok(q)
    }

    // ------------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------------

    /// Starts walking the result pages.
    ///
    /// No request is made until the first entry is pulled. Without an
    /// explicit transport the shared default is built at that point, and a
    /// failure to build it is the stream's first item.
    pub fn iter(&self) -> EntryStream {
        EntryStream::new(
            self.transport.clone(),
            self.request_url(),
            self.params.clone(),
            self.page_limit,
        )
    }

    fn with_param(&self, key: &str, value: impl Into<ParamValue>) -> Self {
        let mut q = self.clone();
        q.params.set(key, value);
        q
    }

    fn with_appended<I, S>(&self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut q = self.clone();
        q.params.append(key, values);
        q
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a QueryBuilder {
    type Item = Result<datanozzle_core::Entry, FetchError>;
    type IntoIter = EntryStream;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .field("page_limit", &self.page_limit)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for QueryBuilder {
    /// Renders the URL of the first page request.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = self.request_url();
        match Url::parse_with_params(&endpoint, self.query_pairs()) {
            Ok(url) => write!(f, "{url}"),
            Err(_) => f.write_str(&endpoint),
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

fn format_epoch_secs(secs: f64) -> String {
    secs.to_string()
}

// ============================================================================
// Tests
// ============================================================================
