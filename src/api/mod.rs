//! dbt Cloud API module
//!
//! Typed endpoint catalogue for the account being extracted. URLs are built
//! from the host URL (`https://cloud.getdbt.com/api` by default) and the
//! account id; every list endpoint goes through the paginated fetcher.

mod client;
mod types;

pub use client::DbtCloudClient;
pub use types::{connection_family, ProjectFilter, DEFAULT_HOST_URL};

#[cfg(test)]
mod tests;
