//! Attribute value types

use crate::error::{Error, Result};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A record as returned by the API, with no fixed shape
pub type RawResource = Value;

/// Attribute name to value, iterated in sorted order
pub type AttributeMap = BTreeMap<String, AttrValue>;

/// A literal leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
}

/// Runtime kind of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    String,
    Number,
    Bool,
    List,
    Map,
    Reference,
}

/// One attribute value of a projected resource.
///
/// `Reference` holds an HCL expression (`dbtcloud_project.x.id`,
/// `var.secret`, `jsonencode(...)`) and is always written unquoted.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Scalar(Scalar),
    List(Vec<AttrValue>),
    Map(AttributeMap),
    Reference(String),
}

impl AttrValue {
    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Create an integer value
    pub fn int(value: i64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(value)))
    }

    /// Create a boolean value
    pub fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    /// Create an unquoted expression value
    pub fn reference(expr: impl Into<String>) -> Self {
        Self::Reference(expr.into())
    }

    /// Convert a JSON value recursively. JSON never yields `Reference`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::bool(*b),
            Value::Number(n) => Self::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Self::string(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Runtime kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Scalar(Scalar::String(_)) => ValueKind::String,
            Self::Scalar(Scalar::Number(_)) => ValueKind::Number,
            Self::Scalar(Scalar::Bool(_)) => ValueKind::Bool,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Reference(_) => ValueKind::Reference,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Whether any direct member of a map or list is a reference
    pub fn has_reference_member(&self) -> bool {
        match self {
            Self::List(items) => items.iter().any(AttrValue::is_reference),
            Self::Map(map) => map.values().any(AttrValue::is_reference),
            _ => false,
        }
    }

    /// Key used to look a foreign key up in a sibling cache.
    ///
    /// Integral numbers and strings both yield their decimal/text form, so
    /// `42` and `"42"` address the same sibling.
    pub fn id_key(&self) -> Option<String> {
        match self {
            Self::Scalar(Scalar::Number(n)) => number_key(n),
            Self::Scalar(Scalar::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Borrow the inner string of a literal string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

fn number_key(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0)
        .map(|f| format!("{f:.0}"))
}

/// Build the initial attribute map for a record, one entry per top-level field
pub fn attributes_from_raw(raw: &RawResource) -> Result<AttributeMap> {
    match raw {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
            .collect()),
        other => Err(Error::shape(
            "<record>",
            "object",
            super::access::type_name(other),
        )),
    }
}
