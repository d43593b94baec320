//! JSON output formatting.

use anyhow::Result;
use datanozzle_core::Entry;
use datanozzle_fetch::QueryBuilder;
use serde::Serialize;

/// Output of the url command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<u32>,
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats entries as an array of wire-format records.
    pub fn format_entries(&self, entries: &[Entry]) -> Result<String> {
        self.format(&entries)
    }

    /// Formats the first request URL of a query.
    pub fn format_query(&self, query: &QueryBuilder) -> Result<String> {
        self.format(&QueryOutput {
            url: query.to_string(),
            page_limit: query.page_limit(),
        })
    }
}
