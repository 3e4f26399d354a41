//! Paginated fetcher
//!
//! Aggregates every page of a list endpoint into one ordered collection.

use super::types::{next_page_url, ListEnvelope, PaginationState, SingleEnvelope};
use crate::error::Result;
use crate::http::HttpClient;
use crate::value::RawResource;
use tracing::{debug, warn};

/// Fetches list and single-object endpoints of the dbt Cloud API
#[derive(Debug, Clone, Copy)]
pub struct PaginatedFetcher<'a> {
    client: &'a HttpClient,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Fetch all pages of a list endpoint.
    ///
    /// The total advertised by the first page bounds the loop. A follow-up
    /// page reporting `count == 0` ends it early: a record may have been
    /// deleted between requests, and continuing would never reach the total.
    pub async fn fetch_all(&self, url: &str) -> Result<Vec<RawResource>> {
        let first: ListEnvelope = self.client.get_json(url).await?;
        let mut state = PaginationState::from_first_page(first.page_info());
        let mut records = first.into_data();

        while state.has_more() {
            let page_url = next_page_url(url, state.offset);
            debug!(
                "Fetching page {} of {} (offset {}/{})",
                state.pages + 1,
                url,
                state.offset,
                state.total_count
            );

            let page: ListEnvelope = self.client.get_json(&page_url).await?;
            if !state.advance(page.page_info()) {
                warn!(
                    "Page at offset {} of {} was empty before reaching {} items, stopping",
                    state.offset, url, state.total_count
                );
                break;
            }
            records.extend(page.into_data());
        }

        debug!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }

    /// Fetch a single-object endpoint and unwrap its `data`
    pub async fn fetch_one(&self, url: &str) -> Result<RawResource> {
        let envelope: SingleEnvelope = self.client.get_json(url).await?;
        Ok(envelope.data)
    }
}
