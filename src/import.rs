//! Import statements for generated resources
//!
//! Every supported resource type has an import id template. `:field`
//! tokens are replaced by fields of the raw record; `:id` is always the
//! resource id. Any other `:` is kept as a separator, so
//! `:project_id::id` becomes `<project_id>:<id>`.

use crate::error::{Error, Result};
use crate::naming::ResourceNamer;
use crate::value::{display_id, RawResource};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static FIELD_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":([a-z_][a-z0-9_]*)").unwrap());

/// Import id template of a resource type
pub fn import_format(resource_type: &str) -> Option<&'static str> {
    let format = match resource_type {
        "dbtcloud_project" => ":id",
        "dbtcloud_project_connection" => ":id::connection_id",
        "dbtcloud_project_repository" => ":id::repository_id",
        "dbtcloud_repository" => ":project_id::id",
        "dbtcloud_job" => ":id",
        "dbtcloud_environment" => ":project_id::id",
        "dbtcloud_environment_variable" => ":project_id::name",
        "dbtcloud_group" => ":id",
        "dbtcloud_user_groups" => ":id",
        "dbtcloud_snowflake_credential" => ":id",
        "dbtcloud_bigquery_credential" => ":project_id::id",
        "dbtcloud_databricks_credential" => ":project_id::id",
        "dbtcloud_connection" => ":project_id::id",
        "dbtcloud_bigquery_connection" => ":project_id::id",
        "dbtcloud_global_connection" => ":id",
        "dbtcloud_extended_attributes" => ":project_id::id",
        "dbtcloud_webhook" => ":id",
        "dbtcloud_notification" => ":id",
        "dbtcloud_service_token" => ":id",
        _ => return None,
    };
    Some(format)
}

/// How import statements are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportStyle {
    /// `terraform import <address> <id>`
    Command,
    /// `import { to = <address> id = "<id>" }`
    #[default]
    Block,
}

/// Builds the import statement of one resource instance
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportAddressBuilder {
    style: ImportStyle,
    namer: ResourceNamer,
}

impl ImportAddressBuilder {
    pub fn new(style: ImportStyle, namer: ResourceNamer) -> Self {
        Self { style, namer }
    }

    pub fn style(&self) -> ImportStyle {
        self.style
    }

    /// Import id from the type's template
    pub fn import_id(&self, resource_type: &str, resource_id: &str, raw: &RawResource) -> Result<String> {
        let format = import_format(resource_type).ok_or_else(|| Error::missing_import_format(resource_type))?;

        let id = FIELD_TOKEN.replace_all(format, |captures: &Captures<'_>| {
            let field = &captures[1];
            if field == "id" {
                return resource_id.to_string();
            }
            match raw.get(field) {
                None | Some(serde_json::Value::Null) => format!("no-{field}"),
                Some(value) => display_id(value).unwrap_or_else(|| value.to_string()),
            }
        });
        Ok(id.into_owned())
    }

    /// Full import statement in the configured style
    pub fn build(&self, resource_type: &str, resource_id: &str, raw: &RawResource) -> Result<String> {
        let id = self.import_id(resource_type, resource_id, raw)?;
        let address = self.namer.address(resource_type, resource_id);

        Ok(match self.style {
            ImportStyle::Command => format!("terraform import {address} {id}"),
            ImportStyle::Block => format!("import {{\n  to = {address}\n  id = \"{id}\"\n}}"),
        })
    }
}
