//! Environments and environment variables

use super::common::{
    project_link, BIGQUERY_CREDENTIAL, CREDENTIAL_TYPES, DATABRICKS_ADAPTER,
    DATABRICKS_CREDENTIAL, ENVIRONMENT, ENVIRONMENT_VARIABLE, EXTENDED_ATTRIBUTES,
    GLOBAL_CONNECTION, PROJECT, SNOWFLAKE_CREDENTIAL,
};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::link::LinkRule;
use crate::secrets::SECRET_PLACEHOLDER;
use crate::value::{attributes_from_raw, AttrValue, AttributeMap, RawAccess, RawResource};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::warn;

/// Prefix dbt Cloud uses for secret environment variables
pub const SECRET_ENV_PREFIX: &str = "DBT_ENV_SECRET_";

/// Key of the project-level default in an environment variable's values
const PROJECT_DEFAULT: &str = "project";

static SLUG_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase, dash-separated form of an environment name
pub fn slugify(name: &str) -> String {
    SLUG_SEPARATORS
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug of an environment name not yet in `taken`, suffixed `-2`, `-3`, ...
/// when another environment already slugifies the same way
fn unique_slug(environment: &str, taken: &mut HashSet<String>) -> String {
    let base = slugify(environment);
    let mut slug = base.clone();
    let mut suffix = 2;
    while taken.contains(&slug) {
        slug = format!("{base}-{suffix}");
        suffix += 1;
    }
    if slug != base {
        warn!(
            "Environment {:?} shares the slug {:?} with another environment, using {:?}",
            environment, base, slug
        );
    }
    taken.insert(slug.clone());
    slug
}

/// `dbtcloud_environment`
#[derive(Debug, Default)]
pub struct EnvironmentProjector;

#[async_trait]
impl ResourceProjector for EnvironmentProjector {
    fn resource_type(&self) -> &'static str {
        ENVIRONMENT
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[
            PROJECT,
            SNOWFLAKE_CREDENTIAL,
            BIGQUERY_CREDENTIAL,
            DATABRICKS_CREDENTIAL,
            GLOBAL_CONNECTION,
            EXTENDED_ATTRIBUTES,
        ]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.environments(filter).await
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        let mut projection = Projection::new(self.instance_id(raw)?, AttributeMap::new()).link(project_link());

        if let Some(credential_id) = raw.opt_i64("credentials_id")? {
            attributes.insert("credential_id".to_string(), AttrValue::int(credential_id));
            projection = projection.link(credential_rule(raw.opt_object("credentials")?)?);
        }

        projection = projection
            .link(LinkRule::reference("connection_id", GLOBAL_CONNECTION, "id"))
            .link(LinkRule::reference(
                "extended_attributes_id",
                EXTENDED_ATTRIBUTES,
                "extended_attributes_id",
            ));

        projection.attributes = attributes;
        Ok(projection)
    }
}

/// Link rule for `credential_id`, depending on the warehouse of the credential
fn credential_rule(credentials: Option<&Value>) -> Result<LinkRule> {
    let Some(credentials) = credentials else {
        return Ok(LinkRule::placeholder(
            "credential_id",
            SECRET_PLACEHOLDER,
            &CREDENTIAL_TYPES,
        ));
    };

    let adapter_version = credentials.opt_str("adapter_version")?.unwrap_or_default();
    let rule = match credentials.opt_str("type")? {
        Some("snowflake") => LinkRule::reference("credential_id", SNOWFLAKE_CREDENTIAL, "credential_id"),
        Some("bigquery") => LinkRule::reference("credential_id", BIGQUERY_CREDENTIAL, "credential_id"),
        _ if adapter_version == DATABRICKS_ADAPTER => {
            LinkRule::reference("credential_id", DATABRICKS_CREDENTIAL, "credential_id")
        }
        _ => LinkRule::placeholder(
            "credential_id",
            format!("---TBD---credential type not supported yet for {adapter_version}---"),
            &CREDENTIAL_TYPES,
        ),
    };
    Ok(rule)
}

/// `dbtcloud_environment_variable`, one instance per project and variable name
#[derive(Debug, Default)]
pub struct EnvironmentVariableProjector;

#[async_trait]
impl ResourceProjector for EnvironmentVariableProjector {
    fn resource_type(&self) -> &'static str {
        ENVIRONMENT_VARIABLE
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT, ENVIRONMENT]
    }

    /// Flattens the per-project variable tables into
    /// `{ id: "<project>_<name>", name, project_id, values }` records
    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let mut records = Vec::new();
        for project in client.projects(filter).await? {
            let project_id = project.req_i64("id")?;
            let variables = client.environment_variables(project_id).await?;
            let Value::Object(variables) = variables else {
                continue;
            };
            for (name, values) in variables {
                records.push(json!({
                    "id": format!("{project_id}_{name}"),
                    "name": name,
                    "project_id": project_id,
                    "values": values,
                }));
            }
        }
        Ok(records)
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let name = raw.req_str("name")?;
        let project_id = raw.req_i64("project_id")?;
        let is_secret = name.starts_with(SECRET_ENV_PREFIX);

        let mut environment_values = AttributeMap::new();
        let mut environment_names = Vec::new();
        let mut slugs = HashSet::new();
        if let Some(Value::Object(values)) = raw.opt_object("values")? {
            for (environment, entry) in values {
                if environment != PROJECT_DEFAULT {
                    environment_names.push(environment.clone());
                }
                if entry.is_null() {
                    continue;
                }
                let Some(literal) = entry.opt_str("value")? else {
                    continue;
                };
                let value = if is_secret {
                    ctx.secrets.redact(
                        format!(
                            "dbtcloud_environment_variable_{project_id}_{name}_{}",
                            unique_slug(environment, &mut slugs)
                        ),
                        format!(
                            "The secret env var for {name} in the environment {environment} in the project {project_id} - {}",
                            ctx.environments_url(project_id)
                        ),
                    )
                } else {
                    AttrValue::string(literal)
                };
                environment_values.insert(environment.clone(), value);
            }
        }

        let mut attributes = AttributeMap::new();
        attributes.insert("name".to_string(), AttrValue::string(name));
        attributes.insert("project_id".to_string(), AttrValue::int(project_id));
        attributes.insert(
            "environment_values".to_string(),
            AttrValue::Map(environment_values),
        );

        Ok(Projection::new(self.instance_id(raw)?, attributes)
            .link(project_link())
            .link(LinkRule::DependsOn {
                target: ENVIRONMENT.to_string(),
                project_id,
                names: environment_names,
            }))
    }
}
