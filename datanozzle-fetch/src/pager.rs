//! Page walking.
//!
//! [`EntryStream`] is the iterator behind [`QueryBuilder::iter`]. It fetches
//! one page at a time, hands out that page's records in server order, and
//! only asks for the next page once the current one is drained.
//!
//! [`QueryBuilder::iter`]: crate::QueryBuilder::iter

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

use datanozzle_core::Entry;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::FetchError;
use crate::host::http::{Transport, default_transport};
use crate::params::{ParamValue, Params};

/// Parameter carrying the 1-indexed page number.
const PAGE_PARAM: &str = "page";

// ============================================================================
// Wire Types
// ============================================================================

/// The parts of a `/raw` response the pager relies on.
#[derive(Debug, Deserialize)]
struct RawPage {
    raw_messages: Vec<Value>,
    pages: u64,
}

impl RawPage {
    fn decode(body: Value) -> Result<Self, FetchError> {
        serde_json::from_value(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

// ============================================================================
// Entry Stream
// ============================================================================

/// Lazy, forward-only sequence of entries across result pages.
///
/// Yields `Err` at most once: after any failure the stream is finished.
pub struct EntryStream {
    /// Resolved to the shared default on the first request when `None`.
    transport: Option<Arc<dyn Transport>>,
    url: String,
    params: Params,
    page_limit: Option<u32>,
    /// Page of the most recent request, or the first page before any request.
    page: u64,
    /// Last page to walk, known after the first response.
    last_page: Option<u64>,
    total_pages: Option<u64>,
    pages_fetched: u32,
    pending: VecDeque<Value>,
    finished: bool,
}

impl EntryStream {
    pub(crate) fn new(
        transport: Option<Arc<dyn Transport>>,
        url: String,
        params: Params,
        page_limit: Option<u32>,
    ) -> Self {
        let page = params
            .get(PAGE_PARAM)
            .and_then(ParamValue::as_single)
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);

        Self {
            transport,
            url,
            params,
            page_limit,
            page,
            last_page: None,
            total_pages: None,
            pages_fetched: 0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Total page count reported by the server, once the first page is in.
    pub fn total_pages(&self) -> Option<u64> {
        self.total_pages
    }

    /// Number of page requests made so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    fn transport(&mut self) -> Result<Arc<dyn Transport>, FetchError> {
        if let Some(transport) = &self.transport {
            return Ok(Arc::clone(transport));
        }
        let transport = default_transport()?;
        self.transport = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Fetches the next page into `pending`. Returns false when the walk is over.
    fn fetch_next_page(&mut self) -> Result<bool, FetchError> {
        if let Some(last_page) = self.last_page {
            let next = self.page + 1;
            if next > last_page {
                debug!(last_page, "Page walk complete");
                return Ok(false);
            }
            self.page = next;
            self.params.set(PAGE_PARAM, next.to_string());
        }

        let transport = self.transport()?;
        debug!(url = %self.url, page = self.page, "Fetching page");
        let body = transport.get_json(&self.url, &self.params.to_query_pairs())?;
        self.pages_fetched += 1;

        let RawPage {
            raw_messages,
            pages,
        } = RawPage::decode(body)?;

        if self.last_page.is_none() {
            let last_page = match self.page_limit {
                Some(limit) => pages.min(u64::from(limit)),
                None => pages,
            };
            self.total_pages = Some(pages);
            self.last_page = Some(last_page);
        }

        debug!(
            page = self.page,
            records = raw_messages.len(),
            total_pages = pages,
            "Page decoded"
        );
        self.pending.extend(raw_messages);
        Ok(true)
    }
}

impl Iterator for EntryStream {
    type Item = Result<Entry, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(record) = self.pending.pop_front() {
                trace!(page = self.page, "Decoding record");
                let entry = Entry::from_value(record).map_err(FetchError::from);
                if entry.is_err() {
                    self.finish();
                }
                return Some(entry);
            }

            match self.fetch_next_page() {
                Ok(true) => {}
                Ok(false) => self.finish(),
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl FusedIterator for EntryStream {}

impl EntryStream {
    fn finish(&mut self) {
        self.finished = true;
        self.pending.clear();
    }
}

impl std::fmt::Debug for EntryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStream")
            .field("url", &self.url)
            .field("page", &self.page)
            .field("last_page", &self.last_page)
            .field("pending", &self.pending.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
