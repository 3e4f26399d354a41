//! Shape-checked accessors for raw API records

use crate::error::{Error, Result};
use serde_json::Value;

/// Name of a JSON value's runtime type, used in shape diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render an id field the way it appears in resource names and import ids.
///
/// Numbers are printed without a fractional part; strings are returned as is.
pub fn display_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string()))
            .or_else(|| n.as_f64().map(|f| format!("{f:.0}"))),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Typed access to fields of a JSON object.
///
/// `opt_*` accessors treat an absent key and an explicit `null` the same way
/// and return `Ok(None)`. A value of the wrong type is always an error.
pub trait RawAccess {
    /// Present, non-null field
    fn field(&self, key: &str) -> Option<&Value>;

    /// Walk nested objects; `None` if any step is missing or not an object
    fn path(&self, keys: &[&str]) -> Option<&Value>;

    fn opt_str(&self, key: &str) -> Result<Option<&str>>;
    fn opt_i64(&self, key: &str) -> Result<Option<i64>>;
    fn opt_bool(&self, key: &str) -> Result<Option<bool>>;
    fn opt_object(&self, key: &str) -> Result<Option<&Value>>;
    fn opt_array(&self, key: &str) -> Result<Option<&Vec<Value>>>;

    fn req_str(&self, key: &str) -> Result<&str> {
        self.opt_str(key)?
            .ok_or_else(|| Error::shape(key, "string", "missing"))
    }

    fn req_i64(&self, key: &str) -> Result<i64> {
        self.opt_i64(key)?
            .ok_or_else(|| Error::shape(key, "integer", "missing"))
    }

    fn req_object(&self, key: &str) -> Result<&Value> {
        self.opt_object(key)?
            .ok_or_else(|| Error::shape(key, "object", "missing"))
    }

    fn req_array(&self, key: &str) -> Result<&Vec<Value>> {
        self.opt_array(key)?
            .ok_or_else(|| Error::shape(key, "array", "missing"))
    }
}

impl RawAccess for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(self, |current, key| current.field(key))
    }

    fn opt_str(&self, key: &str) -> Result<Option<&str>> {
        match self.field(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::shape(key, "string", type_name(other))),
        }
    }

    fn opt_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.field(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| Error::shape(key, "integer", n.to_string())),
            Some(other) => Err(Error::shape(key, "integer", type_name(other))),
        }
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.field(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(Error::shape(key, "bool", type_name(other))),
        }
    }

    fn opt_object(&self, key: &str) -> Result<Option<&Value>> {
        match self.field(key) {
            None => Ok(None),
            Some(v @ Value::Object(_)) => Ok(Some(v)),
            Some(other) => Err(Error::shape(key, "object", type_name(other))),
        }
    }

    fn opt_array(&self, key: &str) -> Result<Option<&Vec<Value>>> {
        match self.field(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(Error::shape(key, "array", type_name(other))),
        }
    }
}
