//! Warehouse credentials

use super::common::{
    copy_field, project_link, BIGQUERY_CREDENTIAL, DATABRICKS_ADAPTER, DATABRICKS_CREDENTIAL,
    PROJECT, SNOWFLAKE_CREDENTIAL,
};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::value::{attributes_from_raw, AttrValue, RawAccess, RawResource};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Page where the credential can be looked up
fn settings_url(ctx: &ProjectionContext<'_>, raw: &RawResource) -> Result<String> {
    let project_id = raw.req_i64("project_id")?;
    Ok(match raw.opt_i64("environment_id")? {
        Some(environment_id) => ctx.environment_settings_url(project_id, environment_id),
        None => ctx.environments_url(project_id),
    })
}

/// Credentials of the fetched projects with the given `type`
async fn credentials_of_type(
    client: &DbtCloudClient,
    filter: &ProjectFilter,
    warehouse: &str,
) -> Result<Vec<RawResource>> {
    let mut kept = Vec::new();
    for credential in client.credentials(filter).await? {
        if credential.opt_str("type")? == Some(warehouse) {
            kept.push(credential);
        }
    }
    Ok(kept)
}

/// `dbtcloud_snowflake_credential`
#[derive(Debug, Default)]
pub struct SnowflakeCredentialProjector;

#[async_trait]
impl ResourceProjector for SnowflakeCredentialProjector {
    fn resource_type(&self) -> &'static str {
        SNOWFLAKE_CREDENTIAL
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        credentials_of_type(client, filter, "snowflake").await
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let instance_id = self.instance_id(raw)?;
        let mut attributes = attributes_from_raw(raw)?;
        copy_field(&mut attributes, raw, "threads", "num_threads");

        let url = settings_url(ctx, raw)?;
        match raw.opt_str("auth_type")? {
            Some("password") => {
                let value = ctx.secrets.redact(
                    format!("dbtcloud_snowflake_credential_password_{instance_id}"),
                    format!("The password for the snowflake credential {instance_id} - {url}"),
                );
                attributes.insert("password".to_string(), value);
            }
            Some("keypair") => {
                let key = ctx.secrets.redact(
                    format!("dbtcloud_snowflake_credential_private_key_{instance_id}"),
                    format!("The private key for the snowflake credential {instance_id} - {url}"),
                );
                attributes.insert("private_key".to_string(), key);
                let passphrase = ctx.secrets.redact(
                    format!("dbtcloud_snowflake_credential_private_key_passphrase_{instance_id}"),
                    format!("The passphrase for the snowflake credential {instance_id} - {url}"),
                );
                attributes.insert("private_key_passphrase".to_string(), passphrase);
            }
            other => debug!("No secret for snowflake auth type {:?}", other),
        }

        Ok(Projection::new(instance_id, attributes).link(project_link()))
    }
}

/// `dbtcloud_bigquery_credential`
#[derive(Debug, Default)]
pub struct BigQueryCredentialProjector;

#[async_trait]
impl ResourceProjector for BigQueryCredentialProjector {
    fn resource_type(&self) -> &'static str {
        BIGQUERY_CREDENTIAL
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        credentials_of_type(client, filter, "bigquery").await
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        copy_field(&mut attributes, raw, "threads", "num_threads");
        copy_field(&mut attributes, raw, "schema", "dataset");

        Ok(Projection::new(self.instance_id(raw)?, attributes).link(project_link()))
    }
}

/// `dbtcloud_databricks_credential`
#[derive(Debug, Default)]
pub struct DatabricksCredentialProjector;

#[async_trait]
impl ResourceProjector for DatabricksCredentialProjector {
    fn resource_type(&self) -> &'static str {
        DATABRICKS_CREDENTIAL
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    /// The list endpoint omits the adapter fields; they are merged in from
    /// `unencrypted_credential_details` of each credential
    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let mut credentials = Vec::new();
        for mut credential in client.credentials(filter).await? {
            if credential.opt_str("adapter_version")? != Some(DATABRICKS_ADAPTER) {
                continue;
            }
            let details = client
                .credential(credential.req_i64("project_id")?, credential.req_i64("id")?)
                .await?;
            if let (Some(Value::Object(extra)), Value::Object(target)) = (
                details.opt_object("unencrypted_credential_details")?,
                &mut credential,
            ) {
                for (key, value) in extra {
                    target.insert(key.clone(), value.clone());
                }
            }
            credentials.push(credential);
        }
        Ok(credentials)
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let instance_id = self.instance_id(raw)?;
        let mut attributes = attributes_from_raw(raw)?;

        // connections carry the adapter now, and the target name moved to the environment
        attributes.remove("adapter_id");
        attributes.remove("target_name");
        attributes.insert("adapter_type".to_string(), AttrValue::string("databricks"));

        let url = settings_url(ctx, raw)?;
        let token = ctx.secrets.redact(
            format!("dbtcloud_databricks_credential_token_{instance_id}"),
            format!("The token for the databricks credential {instance_id} - {url}"),
        );
        attributes.insert("token".to_string(), token);

        Ok(Projection::new(instance_id, attributes).link(project_link()))
    }
}
