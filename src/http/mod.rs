//! HTTP client module
//!
//! GET-only JSON client for the dbt Cloud API.
//!
//! # Features
//!
//! - **Bearer Authentication**: token header on every request
//! - **Request Budget**: per-minute governor limiter shared by all requests
//! - **Status Checking**: non-2xx responses become typed errors

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RequestBudget, DEFAULT_REQUESTS_PER_MINUTE};

#[cfg(test)]
mod tests;
