//! Provider schema types
//!
//! Mirrors the JSON printed by `terraform providers schema -json`.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Registry address of the dbt Cloud provider
pub const PROVIDER_ADDRESS: &str = "registry.terraform.io/dbt-labs/dbtcloud";

/// Top-level document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSchemas {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub provider_schemas: BTreeMap<String, ProviderSchema>,
}

impl ProviderSchemas {
    /// Parse the JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Schema of one provider; missing means the provider was never installed
    pub fn provider(&self, address: &str) -> Result<&ProviderSchema> {
        self.provider_schemas.get(address).ok_or_else(|| {
            Error::schema(format!(
                "provider {address} not found, run `terraform init` with the provider configured"
            ))
        })
    }
}

/// Schemas of one provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub resource_schemas: BTreeMap<String, ResourceSchema>,
}

impl ProviderSchema {
    /// Root block of a resource type
    pub fn resource(&self, resource_type: &str) -> Option<&SchemaBlock> {
        self.resource_schemas.get(resource_type).map(|r| &r.block)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSchema {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub block: SchemaBlock,
}

/// Attributes and nested blocks of one block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaBlock {
    #[serde(default)]
    pub attributes: BTreeMap<String, SchemaAttribute>,
    #[serde(default)]
    pub block_types: BTreeMap<String, NestedBlock>,
}

/// One attribute definition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaAttribute {
    /// Value type; absent for plugin-framework nested attributes
    #[serde(rename = "type", default)]
    pub attribute_type: Option<CtyType>,
    #[serde(default)]
    pub nested_type: Option<NestedAttributeType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
}

/// How the serializer treats an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Primitive,
    Collection,
    Object,
    Tuple,
    Dynamic,
    /// No `type`; value written as provided
    Nested,
}

impl SchemaAttribute {
    /// Computed-only attributes are never written
    pub fn is_emittable(&self) -> bool {
        !(self.computed && !self.optional)
    }

    /// Attribute a user may set inside a nested block
    pub fn is_settable(&self) -> bool {
        self.optional || self.required
    }

    pub fn kind(&self) -> AttributeKind {
        match &self.attribute_type {
            None => AttributeKind::Nested,
            Some(ty) if ty.is_primitive() => AttributeKind::Primitive,
            Some(ty) if ty.is_collection() => AttributeKind::Collection,
            Some(CtyType::Object(_)) => AttributeKind::Object,
            Some(CtyType::Tuple(_)) => AttributeKind::Tuple,
            Some(_) => AttributeKind::Dynamic,
        }
    }
}

/// `nested_type` of a plugin-framework attribute
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedAttributeType {
    #[serde(default)]
    pub attributes: BTreeMap<String, SchemaAttribute>,
    #[serde(default)]
    pub nesting_mode: Option<NestingMode>,
}

/// A nested block type
#[derive(Debug, Clone, Deserialize)]
pub struct NestedBlock {
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub block: SchemaBlock,
    #[serde(default)]
    pub min_items: Option<u64>,
    #[serde(default)]
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    Single,
    Group,
    List,
    Set,
    Map,
}

impl NestingMode {
    /// Whether the block may appear more than once
    pub fn is_repeated(self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }
}

/// A cty type in its JSON encoding: `"string"`, `["list", "string"]`,
/// `["object", {...}]`, ...
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum CtyType {
    String,
    Number,
    Bool,
    Dynamic,
    List(Box<CtyType>),
    Set(Box<CtyType>),
    Map(Box<CtyType>),
    Object(BTreeMap<String, CtyType>),
    Tuple(Vec<CtyType>),
}

impl CtyType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Bool)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(_))
    }

    /// Short human-readable name
    pub fn friendly_name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Dynamic => "dynamic".to_string(),
            Self::List(inner) => format!("list of {}", inner.friendly_name()),
            Self::Set(inner) => format!("set of {}", inner.friendly_name()),
            Self::Map(inner) => format!("map of {}", inner.friendly_name()),
            Self::Object(_) => "object".to_string(),
            Self::Tuple(_) => "tuple".to_string(),
        }
    }
}

impl TryFrom<Value> for CtyType {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::String(name) => match name.as_str() {
                "string" => Ok(Self::String),
                "number" => Ok(Self::Number),
                "bool" => Ok(Self::Bool),
                "dynamic" => Ok(Self::Dynamic),
                other => Err(format!("unknown primitive type {other:?}")),
            },
            Value::Array(mut parts) if parts.len() == 2 => {
                let inner = parts.pop().unwrap_or(Value::Null);
                let kind = parts.pop().unwrap_or(Value::Null);
                match (kind.as_str(), inner) {
                    (Some("list"), inner) => Ok(Self::List(Box::new(inner.try_into()?))),
                    (Some("set"), inner) => Ok(Self::Set(Box::new(inner.try_into()?))),
                    (Some("map"), inner) => Ok(Self::Map(Box::new(inner.try_into()?))),
                    (Some("object"), Value::Object(fields)) => {
                        let mut object = BTreeMap::new();
                        for (name, field) in fields {
                            object.insert(name, Self::try_from(field)?);
                        }
                        Ok(Self::Object(object))
                    }
                    (Some("tuple"), Value::Array(items)) => items
                        .into_iter()
                        .map(Self::try_from)
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map(Self::Tuple),
                    (kind, _) => Err(format!("unknown type constructor {kind:?}")),
                }
            }
            other => Err(format!("invalid type expression {other}")),
        }
    }
}
