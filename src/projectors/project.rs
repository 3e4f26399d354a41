//! Projects, repositories and the links between them

use super::common::{
    project_link, BIGQUERY_CONNECTION, CONNECTION, PROJECT, PROJECT_CONNECTION,
    PROJECT_REPOSITORY, REPOSITORY,
};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{connection_family, DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::link::LinkRule;
use crate::value::{attributes_from_raw, AttrValue, AttributeMap, RawAccess, RawResource};
use async_trait::async_trait;

/// `dbtcloud_project`, written from the raw record
#[derive(Debug, Default)]
pub struct ProjectProjector;

#[async_trait]
impl ResourceProjector for ProjectProjector {
    fn resource_type(&self) -> &'static str {
        PROJECT
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.projects(filter).await
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        Ok(Projection::new(self.instance_id(raw)?, attributes_from_raw(raw)?))
    }
}

/// `dbtcloud_project_repository`, one per project with a repository
#[derive(Debug, Default)]
pub struct ProjectRepositoryProjector;

#[async_trait]
impl ResourceProjector for ProjectRepositoryProjector {
    fn resource_type(&self) -> &'static str {
        PROJECT_REPOSITORY
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT, REPOSITORY]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.projects(filter).await
    }

    fn include(&self, raw: &RawResource) -> Result<bool> {
        Ok(raw.opt_i64("repository_id")?.is_some())
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = AttributeMap::new();
        attributes.insert("project_id".to_string(), AttrValue::int(raw.req_i64("id")?));
        attributes.insert(
            "repository_id".to_string(),
            AttrValue::int(raw.req_i64("repository_id")?),
        );

        Ok(Projection::new(self.instance_id(raw)?, attributes)
            .link(project_link())
            .link(LinkRule::reference(
                "repository_id",
                REPOSITORY,
                "repository_id",
            )))
    }
}

/// `dbtcloud_project_connection`, one per project with a connection
#[derive(Debug, Default)]
pub struct ProjectConnectionProjector;

#[async_trait]
impl ResourceProjector for ProjectConnectionProjector {
    fn resource_type(&self) -> &'static str {
        PROJECT_CONNECTION
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT, CONNECTION, BIGQUERY_CONNECTION]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.projects(filter).await
    }

    fn include(&self, raw: &RawResource) -> Result<bool> {
        Ok(raw.opt_i64("connection_id")?.is_some())
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = AttributeMap::new();
        attributes.insert("project_id".to_string(), AttrValue::int(raw.req_i64("id")?));
        attributes.insert(
            "connection_id".to_string(),
            AttrValue::int(raw.req_i64("connection_id")?),
        );

        let mut projection = Projection::new(self.instance_id(raw)?, attributes).link(project_link());

        // the connection resource type depends on the warehouse
        if let Some(connection) = raw.opt_object("connection")? {
            let target = if connection_family(connection)? == "bigquery" {
                BIGQUERY_CONNECTION
            } else {
                CONNECTION
            };
            projection = projection.link(LinkRule::reference("connection_id", target, "connection_id"));
        }

        Ok(projection)
    }
}

/// `dbtcloud_repository`, written from the raw record
#[derive(Debug, Default)]
pub struct RepositoryProjector;

#[async_trait]
impl ResourceProjector for RepositoryProjector {
    fn resource_type(&self) -> &'static str {
        REPOSITORY
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.repositories(filter).await
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        Ok(Projection::new(self.instance_id(raw)?, attributes_from_raw(raw)?).link(project_link()))
    }
}
