//! Pagination module
//!
//! dbt Cloud list endpoints wrap records in
//! `{ data: [...], extra: { pagination: { count, total_count } } }` and take an
//! `offset` query parameter for follow-up pages.
//!
//! # Overview
//!
//! `PaginatedFetcher::fetch_all` keeps requesting pages until the running
//! count reaches the total advertised by the first page, or a page comes back
//! empty.

mod fetcher;
mod types;

pub use fetcher::PaginatedFetcher;
pub use types::{next_page_url, Extra, ListEnvelope, PageInfo, PaginationState, SingleEnvelope};
