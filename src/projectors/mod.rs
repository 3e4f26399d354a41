//! Resource projectors
//!
//! One projector per supported Terraform resource type. A projector knows
//! how to fetch the raw dbt Cloud records of its type and how to turn one
//! record into the attribute map the provider expects, plus the foreign
//! keys the linker may rewrite.
//!
//! # Example
//!
//! ```ignore
//! let registry = default_registry();
//! let projector = registry.require("dbtcloud_job")?;
//! let records = projector.fetch(&client, &filter).await?;
//! ```

mod account;
mod common;
mod connections;
mod credentials;
mod environment;
mod job;
mod project;
mod types;

pub use account::{
    GroupProjector, NotificationProjector, ServiceTokenProjector, UserGroupsProjector,
    WebhookProjector, DEFAULT_GROUPS,
};
pub use common::*;
pub use connections::{
    adapter_section, BigQueryConnectionProjector, ConnectionProjector,
    ExtendedAttributesProjector, GlobalConnectionProjector, GENERIC_FAMILIES,
};
pub use credentials::{
    BigQueryCredentialProjector, DatabricksCredentialProjector, SnowflakeCredentialProjector,
};
pub use environment::{slugify, EnvironmentProjector, EnvironmentVariableProjector, SECRET_ENV_PREFIX};
pub use job::JobProjector;
pub use project::{
    ProjectConnectionProjector, ProjectProjector, ProjectRepositoryProjector, RepositoryProjector,
};
pub use types::{Projection, ProjectionContext, ProjectorRegistry, ResourceProjector};

/// Registry with a projector for every supported resource type
pub fn default_registry() -> ProjectorRegistry {
    let mut registry = ProjectorRegistry::new();
    registry.register(Box::new(ProjectProjector));
    registry.register(Box::new(ProjectConnectionProjector));
    registry.register(Box::new(ProjectRepositoryProjector));
    registry.register(Box::new(RepositoryProjector));
    registry.register(Box::new(EnvironmentProjector));
    registry.register(Box::new(EnvironmentVariableProjector));
    registry.register(Box::new(JobProjector));
    registry.register(Box::new(SnowflakeCredentialProjector));
    registry.register(Box::new(BigQueryCredentialProjector));
    registry.register(Box::new(DatabricksCredentialProjector));
    registry.register(Box::new(ConnectionProjector));
    registry.register(Box::new(BigQueryConnectionProjector));
    registry.register(Box::new(GlobalConnectionProjector));
    registry.register(Box::new(ExtendedAttributesProjector));
    registry.register(Box::new(GroupProjector));
    registry.register(Box::new(UserGroupsProjector));
    registry.register(Box::new(WebhookProjector));
    registry.register(Box::new(NotificationProjector));
    registry.register(Box::new(ServiceTokenProjector));
    registry
}
