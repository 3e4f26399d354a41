//! dbt Cloud API client
//!
//! Endpoint catalogue on top of `HttpClient` and `PaginatedFetcher`.

use super::types::{connection_family, ProjectFilter};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::PaginatedFetcher;
use crate::value::{RawAccess, RawResource};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Client for the account-scoped v2/v3 endpoints
#[derive(Debug)]
pub struct DbtCloudClient {
    http: HttpClient,
    host_url: String,
    account_id: String,
}

impl DbtCloudClient {
    /// Create a client for `host_url` (including `/api`) authenticating with `token`
    pub fn new(host_url: &str, token: &str, account_id: &str) -> Result<Self> {
        Url::parse(host_url)?;
        if account_id.is_empty() {
            return Err(Error::missing_field("account_id"));
        }

        let http = HttpClient::with_config(HttpClientConfig::builder().bearer_token(token).build())?;
        Ok(Self::with_http(http, host_url, account_id))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(http: HttpClient, host_url: &str, account_id: &str) -> Self {
        Self {
            http,
            host_url: host_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    /// UI base URL, the host URL without its `/api` suffix
    pub fn deploy_url(&self) -> &str {
        self.host_url
            .strip_suffix("/api")
            .unwrap_or(&self.host_url)
    }

    fn v2(&self, path: &str) -> String {
        format!("{}/v2/accounts/{}/{path}", self.host_url, self.account_id)
    }

    fn v3(&self, path: &str) -> String {
        format!("{}/v3/accounts/{}/{path}", self.host_url, self.account_id)
    }

    fn fetcher(&self) -> PaginatedFetcher<'_> {
        PaginatedFetcher::new(&self.http)
    }

    // ============================================================================
    // Project-scoped lists
    // ============================================================================

    pub async fn projects(&self, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let all = self.fetcher().fetch_all(&self.v2("projects/")).await?;
        if filter.is_all() {
            return Ok(all);
        }
        let mut kept = Vec::new();
        for project in all {
            if filter.allows(project.req_i64("id")?) {
                kept.push(project);
            }
        }
        Ok(kept)
    }

    pub async fn jobs(&self, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let all = self.fetcher().fetch_all(&self.v2("jobs/")).await?;
        filter.retain(all)
    }

    pub async fn environments(&self, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let all = self.fetcher().fetch_all(&self.v3("environments/")).await?;
        filter.retain(all)
    }

    pub async fn repositories(&self, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let all = self.fetcher().fetch_all(&self.v2("repositories/")).await?;
        filter.retain(all)
    }

    /// Credentials attached to one of the fetched projects.
    ///
    /// Credentials of deleted projects stay around in dbt Cloud and are skipped.
    pub async fn credentials(&self, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let mut project_ids = Vec::new();
        for project in self.projects(filter).await? {
            project_ids.push(project.req_i64("id")?);
        }

        let all = self.fetcher().fetch_all(&self.v3("credentials/")).await?;
        let mut kept = Vec::new();
        for credential in all {
            if credential
                .opt_i64("project_id")?
                .is_some_and(|id| project_ids.contains(&id))
            {
                kept.push(credential);
            }
        }
        Ok(kept)
    }

    /// Full details of one credential
    pub async fn credential(&self, project_id: i64, credential_id: i64) -> Result<RawResource> {
        self.fetcher()
            .fetch_one(&self.v3(&format!(
                "projects/{project_id}/credentials/{credential_id}/"
            )))
            .await
    }

    /// Active connections of the fetched projects whose family is in `families`.
    ///
    /// Going through the projects skips dangling connections that are no
    /// longer attached to anything.
    pub async fn active_connections(
        &self,
        filter: &ProjectFilter,
        families: &[&str],
    ) -> Result<Vec<RawResource>> {
        let mut connections = Vec::new();
        for project in self.projects(filter).await? {
            let Some(connection) = project.opt_object("connection")? else {
                continue;
            };
            let family = connection_family(connection)?;
            if !families.contains(&family.as_str()) {
                debug!("Skipping connection family {}", family);
                continue;
            }
            let project_id = project.req_i64("id")?;
            let connection_id = connection.req_i64("id")?;
            connections.push(self.project_connection(project_id, connection_id).await?);
        }
        Ok(connections)
    }

    /// One connection as seen from its project
    pub async fn project_connection(
        &self,
        project_id: i64,
        connection_id: i64,
    ) -> Result<RawResource> {
        self.fetcher()
            .fetch_one(&self.v3(&format!(
                "projects/{project_id}/connections/{connection_id}/"
            )))
            .await
    }

    /// The `variables` object of a project's environment variables:
    /// `{ NAME: { <environment name>: { id, value } | null, ... } }`
    pub async fn environment_variables(&self, project_id: i64) -> Result<RawResource> {
        let data = self
            .fetcher()
            .fetch_one(&self.v3(&format!(
                "projects/{project_id}/environment-variables/environment/"
            )))
            .await?;
        Ok(data
            .opt_object("variables")?
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    pub async fn extended_attributes(&self, project_id: i64) -> Result<Vec<RawResource>> {
        self.fetcher()
            .fetch_all(&self.v3(&format!("projects/{project_id}/extended-attributes/")))
            .await
    }

    // ============================================================================
    // Account-wide lists
    // ============================================================================

    pub async fn groups(&self) -> Result<Vec<RawResource>> {
        self.fetcher().fetch_all(&self.v3("groups/")).await
    }

    pub async fn users(&self) -> Result<Vec<RawResource>> {
        self.fetcher().fetch_all(&self.v3("users/")).await
    }

    pub async fn webhooks(&self) -> Result<Vec<RawResource>> {
        self.fetcher()
            .fetch_all(&self.v3("webhooks/subscriptions"))
            .await
    }

    pub async fn notifications(&self) -> Result<Vec<RawResource>> {
        self.fetcher().fetch_all(&self.v2("notifications/")).await
    }

    pub async fn service_tokens(&self) -> Result<Vec<RawResource>> {
        self.fetcher().fetch_all(&self.v3("service-tokens/")).await
    }

    pub async fn service_token_permissions(&self, token_id: i64) -> Result<Vec<RawResource>> {
        self.fetcher()
            .fetch_all(&self.v3(&format!("service-tokens/{token_id}/permissions/")))
            .await
    }

    /// Global connections with their adapter `config`, which only the detail
    /// endpoint returns
    pub async fn global_connections(&self) -> Result<Vec<RawResource>> {
        let summaries = self.fetcher().fetch_all(&self.v3("connections/")).await?;
        let mut connections = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let id = summary.req_i64("id")?;
            connections.push(
                self.fetcher()
                    .fetch_one(&self.v3(&format!("connections/{id}/")))
                    .await?,
            );
        }
        Ok(connections)
    }
}
