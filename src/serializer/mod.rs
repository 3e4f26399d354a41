//! Serializer module
//!
//! Turns projected attribute maps into Terraform configuration, driven by
//! the provider schema so only attributes a user can set are written.
//!
//! # Overview
//!
//! - `SchemaSerializer` - one `resource` block per projected instance
//! - `ConfigDocument` - resource blocks plus the variable, locals and
//!   tfvars sections, separated by blank lines
//! - references (`dbtcloud_project.x.id`, `var.secret`, ...) are parsed into
//!   real HCL expressions and written unquoted, next to quoted literals

mod document;
mod expression;
mod writer;

pub use document::{format_block, ConfigDocument, JOB_LOCALS};
pub use expression::{attribute_expression, expression, is_omitted, reference_expression};
pub use writer::SchemaSerializer;
