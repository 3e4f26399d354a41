//! Pagination types
//!
//! Response envelopes of the dbt Cloud API and the offset bookkeeping used
//! while walking a list endpoint.

use serde::Deserialize;
use serde_json::Value;

/// Page counters reported under `extra.pagination`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    /// Number of items in this page
    #[serde(default)]
    pub count: u64,
    /// Number of items across all pages
    #[serde(default)]
    pub total_count: u64,
}

/// The `extra` section of a list response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Extra {
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// `{ data: [...], extra: { pagination: {...} } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub extra: Option<Extra>,
}

impl ListEnvelope {
    /// Page counters, defaulting to a single complete page when absent
    pub fn page_info(&self) -> PageInfo {
        self.extra
            .as_ref()
            .and_then(|e| e.pagination)
            .unwrap_or_else(|| {
                let len = self.data.as_ref().map_or(0, Vec::len) as u64;
                PageInfo {
                    count: len,
                    total_count: len,
                }
            })
    }

    /// Take the records out of the envelope
    pub fn into_data(self) -> Vec<Value> {
        self.data.unwrap_or_default()
    }
}

/// `{ data: {...} }`
#[derive(Debug, Clone, Deserialize)]
pub struct SingleEnvelope<T = Value> {
    pub data: T,
}

/// Tracks progress through a paginated list
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Items received so far, also the next `offset`
    pub offset: u64,
    /// Total advertised by the first page
    pub total_count: u64,
    /// Pages requested so far
    pub pages: u32,
    /// Set when a follow-up page came back empty
    pub stopped_early: bool,
}

impl PaginationState {
    /// Start from the counters of the first page
    pub fn from_first_page(info: PageInfo) -> Self {
        Self {
            offset: info.count,
            total_count: info.total_count,
            pages: 1,
            stopped_early: false,
        }
    }

    /// Whether another page should be requested
    pub fn has_more(&self) -> bool {
        !self.stopped_early && self.offset < self.total_count
    }

    /// Record a follow-up page. Returns `false` when the page was empty.
    pub fn advance(&mut self, info: PageInfo) -> bool {
        self.pages += 1;
        if info.count == 0 {
            self.stopped_early = true;
            return false;
        }
        self.offset += info.count;
        true
    }
}

/// Append the `offset` parameter to a list URL
pub fn next_page_url(url: &str, offset: u64) -> String {
    if url.contains('?') {
        format!("{url}&offset={offset}")
    } else {
        format!("{url}?offset={offset}")
    }
}
