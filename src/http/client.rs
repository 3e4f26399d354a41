//! Authenticated JSON client
//!
//! Every request takes a slot from the request budget before it is sent.
//! Non-2xx responses become `Error::HttpStatus`; nothing is retried.

use super::rate_limit::{RequestBudget, DEFAULT_REQUESTS_PER_MINUTE};
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Settings of an `HttpClient`
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for request paths that are not absolute URLs
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// `None` sends requests without waiting
    pub requests_per_minute: Option<u32>,
    pub bearer_token: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(60),
            requests_per_minute: Some(DEFAULT_REQUESTS_PER_MINUTE),
            bearer_token: None,
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn requests_per_minute(mut self, per_minute: u32) -> Self {
        self.config.requests_per_minute = Some(per_minute);
        self
    }

    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.config.requests_per_minute = None;
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// GET-only client for the dbt Cloud JSON API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    budget: Option<RequestBudget>,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("dbtcloud-terraforming/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let budget = config.requests_per_minute.map(RequestBudget::per_minute);

        Ok(Self {
            client,
            config,
            budget,
        })
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let full_url = self.resolve(url);
        if let Some(budget) = &self.budget {
            if !budget.try_acquire() {
                debug!("Request budget exhausted, waiting for a slot");
                budget.acquire().await;
            }
        }

        let mut request = self.client.get(&full_url).header(ACCEPT, "application/json");
        if let Some(token) = &self.config.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), full_url, body));
        }

        debug!("GET {} -> {}", full_url, status);
        Ok(response.json().await?)
    }

    pub fn budget(&self) -> Option<&RequestBudget> {
        self.budget.as_ref()
    }

    /// Absolute URL for `path`, joined onto the base URL when relative
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.config.bearer_token.is_some())
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}
