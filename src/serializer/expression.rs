//! Attribute values to HCL expressions

use crate::error::{Error, Result};
use crate::value::{AttrValue, Scalar, ValueKind};
use hcl::{Expression, Object, ObjectKey};
use tracing::warn;

/// Parse an unquoted expression such as `dbtcloud_project.x.id` or
/// `jsonencode({...})`
pub fn reference_expression(text: &str) -> Result<Expression> {
    let body = hcl::parse(&format!("value = {text}\n"))?;
    body.into_attributes()
        .next()
        .map(|attribute| attribute.expr)
        .ok_or_else(|| Error::Other(format!("Not an expression: {text}")))
}

/// Whether a top-level attribute value is left out of the output.
///
/// Null values, empty literal strings and empty lists are never written;
/// an empty map is written as `{}`.
pub fn is_omitted(value: &AttrValue) -> bool {
    match value {
        AttrValue::Null => true,
        AttrValue::Scalar(Scalar::String(s)) => s.is_empty(),
        AttrValue::List(items) => items.iter().all(AttrValue::is_null),
        _ => false,
    }
}

/// Expression of an attribute value, or `None` when nothing is written
pub fn attribute_expression(name: &str, value: &AttrValue) -> Result<Option<Expression>> {
    if is_omitted(value) {
        return Ok(None);
    }
    match value {
        AttrValue::List(items) => {
            let mut groups = split_by_kind(items);
            if groups.len() > 1 {
                warn!(
                    "Attribute {} mixes {} kinds of values, only the last group is written",
                    name,
                    groups.len()
                );
            }
            match groups.pop() {
                Some(group) => Ok(Some(list_expression(&group)?)),
                None => Ok(None),
            }
        }
        other => Ok(Some(expression(other)?)),
    }
}

/// Expression of any value, with nothing omitted at this level
pub fn expression(value: &AttrValue) -> Result<Expression> {
    Ok(match value {
        AttrValue::Null => Expression::Null,
        AttrValue::Scalar(Scalar::String(s)) => Expression::String(s.clone()),
        AttrValue::Scalar(Scalar::Bool(b)) => Expression::Bool(*b),
        AttrValue::Scalar(Scalar::Number(n)) => number_expression(n),
        AttrValue::Reference(text) => reference_expression(text)?,
        AttrValue::List(items) => {
            let items: Vec<&AttrValue> = items.iter().filter(|v| !v.is_null()).collect();
            list_expression(&items)?
        }
        AttrValue::Map(map) => {
            let mut object = Object::new();
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                object.insert(ObjectKey::from(key.as_str()), expression(value)?);
            }
            Expression::Object(object)
        }
    })
}

fn list_expression(items: &[&AttrValue]) -> Result<Expression> {
    let mut array = Vec::with_capacity(items.len());
    for item in items {
        array.push(expression(item)?);
    }
    Ok(Expression::Array(array))
}

fn number_expression(n: &serde_json::Number) -> Expression {
    if let Some(i) = n.as_i64() {
        Expression::Number(hcl::Number::from(i))
    } else if let Some(u) = n.as_u64() {
        Expression::Number(hcl::Number::from(u))
    } else {
        n.as_f64()
            .and_then(hcl::Number::from_f64)
            .map_or(Expression::Null, Expression::Number)
    }
}

/// Same-kind groups of a list, in text, number, bool, structured order.
///
/// References join the numbers when the list holds numbers and no literal
/// text, and count as text otherwise. Null members are dropped.
fn split_by_kind(items: &[AttrValue]) -> Vec<Vec<&AttrValue>> {
    let has_kind = |kind: ValueKind| items.iter().any(|item| item.kind() == kind);
    let references_are_numbers = has_kind(ValueKind::Number) && !has_kind(ValueKind::String);

    let mut groups: [Vec<&AttrValue>; 4] = Default::default();
    for item in items {
        let group = match item.kind() {
            ValueKind::Null => continue,
            ValueKind::Reference if references_are_numbers => 1,
            ValueKind::String | ValueKind::Reference => 0,
            ValueKind::Number => 1,
            ValueKind::Bool => 2,
            ValueKind::List | ValueKind::Map => 3,
        };
        groups[group].push(item);
    }

    groups.into_iter().filter(|group| !group.is_empty()).collect()
}
