//! Shared test helpers.

use std::sync::{Arc, Mutex};

use datanozzle_fetch::{FetchError, Transport};
use serde_json::{Value, json};

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Values sent for a key, in order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The page number sent, if any.
    pub fn page(&self) -> Option<u64> {
        self.values("page").first().and_then(|p| p.parse().ok())
    }
}

/// Serves a fixed set of pages, chosen by the `page` parameter (default 1).
#[derive(Clone)]
pub struct PagedServer {
    pages: Arc<Vec<Value>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl PagedServer {
    /// A server with `total` pages of `per_page` records each.
    pub fn new(total: u64, per_page: u64) -> Self {
        let pages = (1..=total)
            .map(|page| {
                let records: Vec<Value> = (0..per_page)
                    .map(|n| record((page - 1) * per_page + n + 1))
                    .collect();
                json!({"raw_messages": records, "pages": total, "count": per_page})
            })
            .collect();
        Self::from_pages(pages)
    }

    /// A server returning exactly these bodies.
    pub fn from_pages(pages: Vec<Value>) -> Self {
        Self {
            pages: Arc::new(pages),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request made so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Request {
        self.requests().pop().expect("no request was made")
    }
}

impl Transport for PagedServer {
    fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        let request = Request {
            url: url.to_string(),
            query: query.to_vec(),
        };
        let page = request.page().unwrap_or(1);
        self.requests.lock().unwrap().push(request);

        let index = usize::try_from(page - 1).unwrap();
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| FetchError::UnexpectedStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// A well-formed record with sequence number `i`.
pub fn record(i: u64) -> Value {
    json!({
        "certificate": "some_certificate",
        "signature": "some_signature",
        "i": i,
        "timestamp": 1_371_144_251 + i,
        "topic": "org.fedoraproject.prod.fas.user.create",
        "msg": {"user": "sross", "seq": i},
        "meta": {"title": "fas.user.create"}
    })
}
