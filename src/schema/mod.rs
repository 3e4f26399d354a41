//! Provider schema module
//!
//! Loads the dbt Cloud provider schema that drives serialization.
//!
//! # Features
//!
//! - **Schema Types**: attribute and nested block definitions with
//!   required/optional/computed flags and cty value types
//! - **Sources**: a saved JSON file or `terraform providers schema -json`

mod source;
mod types;

pub use source::{JsonFileSchema, SchemaSource, TerraformCli};
pub use types::{
    AttributeKind, CtyType, NestedAttributeType, NestedBlock, NestingMode, ProviderSchema,
    ProviderSchemas, ResourceSchema, SchemaAttribute, SchemaBlock, PROVIDER_ADDRESS,
};
