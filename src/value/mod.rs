//! Value module
//!
//! Typed views over the loosely-shaped records returned by the dbt Cloud API.
//!
//! # Overview
//!
//! - `RawResource` - a record exactly as fetched (`serde_json::Value`)
//! - `RawAccess` - accessors that report a typed `Error::Shape` on mismatch
//! - `AttrValue` / `AttributeMap` - the schema-aligned attribute tree that
//!   projectors build and the serializer consumes

mod access;
mod types;

pub use access::{display_id, type_name, RawAccess};
pub use types::{attributes_from_raw, AttrValue, AttributeMap, RawResource, Scalar, ValueKind};
