//! Connections and extended attributes

use super::common::{
    copy_field, path_str, project_link, promote, BIGQUERY_CONNECTION, CONNECTION,
    EXTENDED_ATTRIBUTES, GLOBAL_CONNECTION, PROJECT,
};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{connection_family, DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::value::{attributes_from_raw, AttrValue, AttributeMap, RawAccess, RawResource};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Connection families written as `dbtcloud_connection`
pub const GENERIC_FAMILIES: [&str; 5] = [
    "snowflake",
    "postgres",
    "redshift",
    "adapter/spark",
    "adapter/databricks",
];

const OAUTH_PLACEHOLDER: &str = "---TBD if using OAuth, otherwise delete---";

/// Secret fields of a global connection config and how they are described
const GLOBAL_CONNECTION_SECRETS: [(&str, &str); 5] = [
    ("oauth_client_id", "OAuth client ID"),
    ("oauth_client_secret", "OAuth client secret"),
    ("private_key", "private key"),
    ("application_id", "application ID"),
    ("application_secret", "application secret"),
];

static ADAPTER_VERSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_v\d+$").unwrap());

/// Config section of a global connection: `snowflake_v0` -> `snowflake`
pub fn adapter_section(adapter_version: &str) -> String {
    ADAPTER_VERSION_SUFFIX.replace(adapter_version, "").into_owned()
}

/// Top-level fields of a project connection with its `details` promoted
fn promoted_connection(raw: &RawResource) -> Result<AttributeMap> {
    let mut attributes = attributes_from_raw(raw)?;
    attributes.remove("details");
    promote(&mut attributes, raw, "details")?;
    // `details` has its own id
    copy_field(&mut attributes, raw, "id", "id");
    copy_field(&mut attributes, raw, "project_id", "project_id");
    Ok(attributes)
}

/// `dbtcloud_connection`
#[derive(Debug, Default)]
pub struct ConnectionProjector;

#[async_trait]
impl ResourceProjector for ConnectionProjector {
    fn resource_type(&self) -> &'static str {
        CONNECTION
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.active_connections(filter, &GENERIC_FAMILIES).await
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = promoted_connection(raw)?;
        let details = raw.opt_object("details")?;

        match connection_family(raw)?.as_str() {
            "snowflake" => {
                for field in ["oauth_client_id", "oauth_client_secret"] {
                    attributes.insert(field.to_string(), AttrValue::string(OAUTH_PLACEHOLDER));
                }
            }
            "redshift" | "postgres" => {
                if let Some(details) = details {
                    copy_field(&mut attributes, details, "hostname", "host_name");
                    copy_field(&mut attributes, details, "dbname", "database");
                }
            }
            "adapter/databricks" => {
                for (source, target) in [("host", "host_name"), ("http_path", "http_path"), ("catalog", "catalog")] {
                    let path = ["details", "connection_details", "fields", source, "value"];
                    if let Some(value) = path_str(raw, &path)? {
                        attributes.insert(target.to_string(), AttrValue::string(value));
                    }
                }
                // empty literals are omitted, so the required database is written as an expression
                attributes.insert("database".to_string(), AttrValue::reference("\"\""));
            }
            _ => {}
        }

        Ok(Projection::new(self.instance_id(raw)?, attributes).link(project_link()))
    }
}

/// `dbtcloud_bigquery_connection`
#[derive(Debug, Default)]
pub struct BigQueryConnectionProjector;

#[async_trait]
impl ResourceProjector for BigQueryConnectionProjector {
    fn resource_type(&self) -> &'static str {
        BIGQUERY_CONNECTION
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.active_connections(filter, &["bigquery"]).await
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let instance_id = self.instance_id(raw)?;
        let mut attributes = promoted_connection(raw)?;

        // `project_id` is the dbt Cloud project, the GCP one comes from the details
        attributes.remove("gcp_project_id");
        if let Some(details) = raw.opt_object("details")? {
            copy_field(&mut attributes, details, "project_id", "gcp_project_id");
        }

        let connection_id = raw.req_i64("id")?;
        let private_key = ctx.secrets.redact(
            format!("dbtcloud_bigquery_connection_private_key_{instance_id}"),
            format!(
                "The private key for the bigquery connection {instance_id} - {}",
                ctx.connection_url(connection_id)
            ),
        );
        attributes.insert("private_key".to_string(), private_key);

        Ok(Projection::new(instance_id, attributes).link(project_link()))
    }
}

/// `dbtcloud_global_connection`
#[derive(Debug, Default)]
pub struct GlobalConnectionProjector;

#[async_trait]
impl ResourceProjector for GlobalConnectionProjector {
    fn resource_type(&self) -> &'static str {
        GLOBAL_CONNECTION
    }

    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.global_connections().await
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let instance_id = self.instance_id(raw)?;
        let connection_id = raw.req_i64("id")?;
        let mut attributes = attributes_from_raw(raw)?;
        attributes.remove("config");

        let section = adapter_section(raw.req_str("adapter_version")?);

        if let Some(Value::Object(config)) = raw.opt_object("config")? {
            let mut values: AttributeMap = config
                .iter()
                .filter(|(key, _)| key.as_str() != "adapter_id")
                .map(|(key, value)| (key.clone(), AttrValue::from_json(value)))
                .collect();

            for (field, label) in GLOBAL_CONNECTION_SECRETS {
                if values.contains_key(field) {
                    let value = ctx.secrets.redact(
                        format!("dbtcloud_global_connection_{field}_{instance_id}"),
                        format!(
                            "The {label} for the global connection {instance_id} - {}",
                            ctx.connection_url(connection_id)
                        ),
                    );
                    values.insert(field.to_string(), value);
                }
            }

            if section == "bigquery" {
                if let Some(gcp_project_id) = values.remove("project_id") {
                    values.insert("gcp_project_id".to_string(), gcp_project_id);
                }
            }

            attributes.insert(section, AttrValue::Map(values));
        }

        Ok(Projection::new(instance_id, attributes))
    }
}

/// `dbtcloud_extended_attributes`, fetched project by project
#[derive(Debug, Default)]
pub struct ExtendedAttributesProjector;

#[async_trait]
impl ResourceProjector for ExtendedAttributesProjector {
    fn resource_type(&self) -> &'static str {
        EXTENDED_ATTRIBUTES
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let mut records = Vec::new();
        for project in client.projects(filter).await? {
            records.extend(client.extended_attributes(project.req_i64("id")?).await?);
        }
        Ok(records)
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        attributes.remove("state");

        if let Some(payload) = raw.opt_object("extended_attributes")? {
            attributes.insert(
                "extended_attributes".to_string(),
                AttrValue::reference(format!("jsonencode({})", json_expression(payload)?)),
            );
        }

        Ok(Projection::new(self.instance_id(raw)?, attributes).link(project_link()))
    }
}

/// JSON text usable as an HCL object expression, with template markers escaped
fn json_expression(payload: &Value) -> Result<String> {
    Ok(serde_json::to_string(payload)?
        .replace("${", "$${")
        .replace("%{", "%%{"))
}
