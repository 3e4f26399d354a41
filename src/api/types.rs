//! API scoping types

use crate::error::Result;
use crate::value::{RawAccess, RawResource};
use serde_json::Value;

/// Default dbt Cloud API host, including the `/api` suffix
pub const DEFAULT_HOST_URL: &str = "https://cloud.getdbt.com/api";

/// Project allow-list. Empty means every project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    projects: Vec<i64>,
}

impl ProjectFilter {
    pub fn new(projects: impl IntoIterator<Item = i64>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
        }
    }

    /// Filter that lets every project through
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn allows(&self, project_id: i64) -> bool {
        self.is_all() || self.projects.contains(&project_id)
    }

    pub fn projects(&self) -> &[i64] {
        &self.projects
    }

    /// Keep records whose `project_id` is allowed.
    ///
    /// Records without a project are dropped once a filter is set.
    pub fn retain(&self, records: Vec<RawResource>) -> Result<Vec<RawResource>> {
        if self.is_all() {
            return Ok(records);
        }
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if record
                .opt_i64("project_id")?
                .is_some_and(|id| self.allows(id))
            {
                kept.push(record);
            }
        }
        Ok(kept)
    }
}

/// Warehouse family of a project's active connection.
///
/// Generic `adapter` connections carry the real family deep inside
/// `details.connection_details.fields.type.value`, reported as `adapter/<value>`.
pub fn connection_family(connection: &Value) -> Result<String> {
    let kind = connection.req_str("type")?;
    if kind != "adapter" {
        return Ok(kind.to_string());
    }
    let value = connection
        .req_object("details")?
        .req_object("connection_details")?
        .req_object("fields")?
        .req_object("type")?
        .req_str("value")?;
    Ok(format!("adapter/{value}"))
}
