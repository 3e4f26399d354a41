//! Projector trait, projection context and registry

use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::{Error, Result};
use crate::link::LinkRule;
use crate::secrets::SecretRegistry;
use crate::value::{display_id, AttributeMap, RawResource};
use async_trait::async_trait;
use std::collections::HashMap;

/// Run-wide inputs and accumulators available to projectors
#[derive(Debug)]
pub struct ProjectionContext<'a> {
    /// Secret variables registered so far
    pub secrets: &'a mut SecretRegistry,
    /// dbt Cloud UI base URL, used in variable descriptions
    pub deploy_url: &'a str,
    /// Account being exported
    pub account_id: &'a str,
    /// Write job triggers as `local.deactivate_jobs_*` conditionals
    pub parameterize_jobs: bool,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(secrets: &'a mut SecretRegistry, deploy_url: &'a str, account_id: &'a str) -> Self {
        Self {
            secrets,
            deploy_url,
            account_id,
            parameterize_jobs: false,
        }
    }

    /// Enable job parameterization
    #[must_use]
    pub fn with_parameterized_jobs(mut self, enabled: bool) -> Self {
        self.parameterize_jobs = enabled;
        self
    }

    /// Settings page of an environment, linked from credential variables
    pub fn environment_settings_url(&self, project_id: i64, environment_id: i64) -> String {
        format!(
            "{}/deploy/{}/projects/{project_id}/environments/{environment_id}/settings/",
            self.deploy_url, self.account_id
        )
    }

    /// Environment list of a project
    pub fn environments_url(&self, project_id: i64) -> String {
        format!(
            "{}/deploy/{}/projects/{project_id}/environments/",
            self.deploy_url, self.account_id
        )
    }

    /// Settings page of a connection
    pub fn connection_url(&self, connection_id: i64) -> String {
        format!(
            "{}/settings/accounts/{}/pages/connections/{connection_id}/",
            self.deploy_url, self.account_id
        )
    }
}

/// A projected resource instance
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Id used for the instance name
    pub instance_id: String,
    /// Attributes named after the provider schema
    pub attributes: AttributeMap,
    /// Foreign keys for the linker
    pub links: Vec<LinkRule>,
}

impl Projection {
    pub fn new(instance_id: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            instance_id: instance_id.into(),
            attributes,
            links: Vec::new(),
        }
    }

    /// Add a link rule
    #[must_use]
    pub fn link(mut self, rule: LinkRule) -> Self {
        self.links.push(rule);
        self
    }

    /// Add several link rules
    #[must_use]
    pub fn links(mut self, rules: impl IntoIterator<Item = LinkRule>) -> Self {
        self.links.extend(rules);
        self
    }
}

/// Converts raw API records of one resource type into attribute maps
#[async_trait]
pub trait ResourceProjector: Send + Sync {
    /// Provider resource type, e.g. `dbtcloud_job`
    fn resource_type(&self) -> &'static str;

    /// Resource types this projector may reference
    fn links_to(&self) -> &'static [&'static str] {
        &[]
    }

    /// Fetch the raw records, including any side-fetch
    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>>;

    /// Whether a fetched record is exported at all
    fn include(&self, _raw: &RawResource) -> Result<bool> {
        Ok(true)
    }

    /// Id used to name the instance, by default the record's `id`
    fn instance_id(&self, raw: &RawResource) -> Result<String> {
        match raw.get("id") {
            Some(id) => display_id(id).ok_or_else(|| {
                Error::shape("id", "number or string", crate::value::type_name(id))
            }),
            None => Err(Error::shape("id", "number or string", "missing")),
        }
    }

    /// Build the attribute map and link rules of one record
    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection>;
}

/// Projectors keyed by resource type, in registration order
#[derive(Default)]
pub struct ProjectorRegistry {
    order: Vec<&'static str>,
    projectors: HashMap<&'static str, Box<dyn ResourceProjector>>,
}

impl ProjectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a projector, replacing any previous one for the same type
    pub fn register(&mut self, projector: Box<dyn ResourceProjector>) {
        let resource_type = projector.resource_type();
        if self.projectors.insert(resource_type, projector).is_none() {
            self.order.push(resource_type);
        }
    }

    pub fn get(&self, resource_type: &str) -> Option<&dyn ResourceProjector> {
        self.projectors.get(resource_type).map(AsRef::as_ref)
    }

    /// Lookup that fails for unregistered types
    pub fn require(&self, resource_type: &str) -> Result<&dyn ResourceProjector> {
        self.get(resource_type)
            .ok_or_else(|| Error::unsupported(resource_type))
    }

    /// Registered resource types in registration order
    pub fn resource_types(&self) -> &[&'static str] {
        &self.order
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.projectors.contains_key(resource_type)
    }
}

impl std::fmt::Debug for ProjectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectorRegistry")
            .field("resource_types", &self.order)
            .finish()
    }
}
