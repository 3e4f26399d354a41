//! Resource type names and helpers shared by projectors

use crate::error::{Error, Result};
use crate::link::LinkRule;
use crate::value::{type_name, AttrValue, AttributeMap, RawAccess, RawResource};
use serde_json::Value;

pub const PROJECT: &str = "dbtcloud_project";
pub const PROJECT_CONNECTION: &str = "dbtcloud_project_connection";
pub const PROJECT_REPOSITORY: &str = "dbtcloud_project_repository";
pub const REPOSITORY: &str = "dbtcloud_repository";
pub const ENVIRONMENT: &str = "dbtcloud_environment";
pub const ENVIRONMENT_VARIABLE: &str = "dbtcloud_environment_variable";
pub const JOB: &str = "dbtcloud_job";
pub const SNOWFLAKE_CREDENTIAL: &str = "dbtcloud_snowflake_credential";
pub const BIGQUERY_CREDENTIAL: &str = "dbtcloud_bigquery_credential";
pub const DATABRICKS_CREDENTIAL: &str = "dbtcloud_databricks_credential";
pub const CONNECTION: &str = "dbtcloud_connection";
pub const BIGQUERY_CONNECTION: &str = "dbtcloud_bigquery_connection";
pub const GLOBAL_CONNECTION: &str = "dbtcloud_global_connection";
pub const EXTENDED_ATTRIBUTES: &str = "dbtcloud_extended_attributes";
pub const GROUP: &str = "dbtcloud_group";
pub const USER_GROUPS: &str = "dbtcloud_user_groups";
pub const WEBHOOK: &str = "dbtcloud_webhook";
pub const NOTIFICATION: &str = "dbtcloud_notification";
pub const SERVICE_TOKEN: &str = "dbtcloud_service_token";

/// Credential resource types an environment can point at
pub const CREDENTIAL_TYPES: [&str; 3] = [SNOWFLAKE_CREDENTIAL, BIGQUERY_CREDENTIAL, DATABRICKS_CREDENTIAL];

/// Adapter version of Databricks credentials and connections
pub const DATABRICKS_ADAPTER: &str = "databricks_v0";

/// `project_id` to `dbtcloud_project.<name>.id`
pub fn project_link() -> LinkRule {
    LinkRule::reference("project_id", PROJECT, "id")
}

/// Copy every member of the `key` object to the top level, overwriting
pub fn promote(attributes: &mut AttributeMap, raw: &RawResource, key: &str) -> Result<()> {
    let Some(Value::Object(members)) = raw.opt_object(key)? else {
        return Ok(());
    };
    for (name, value) in members {
        attributes.insert(name.clone(), AttrValue::from_json(value));
    }
    Ok(())
}

/// Set `to` from the raw field `from`, leaving the attribute unset when absent
pub fn copy_field(attributes: &mut AttributeMap, raw: &RawResource, from: &str, to: &str) {
    if let Some(value) = raw.field(from) {
        attributes.insert(to.to_string(), AttrValue::from_json(value));
    }
}

/// Integer at a nested path, with the full path in the shape error
pub fn path_i64(raw: &RawResource, keys: &[&str]) -> Result<Option<i64>> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(None);
    };
    match raw.path(parents) {
        Some(parent) => parent
            .opt_i64(last)
            .map_err(|_| path_shape(keys, "integer", parent.get(*last))),
        None => Ok(None),
    }
}

/// String at a nested path, with the full path in the shape error
pub fn path_str<'a>(raw: &'a RawResource, keys: &[&str]) -> Result<Option<&'a str>> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(None);
    };
    match raw.path(parents) {
        Some(parent) => parent
            .opt_str(last)
            .map_err(|_| path_shape(keys, "string", parent.get(*last))),
        None => Ok(None),
    }
}

fn path_shape(keys: &[&str], expected: &'static str, found: Option<&Value>) -> Error {
    Error::shape(keys.join("."), expected, found.map_or("missing", type_name))
}
