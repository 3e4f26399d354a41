//! Schema-driven resource block writer

use super::expression::{attribute_expression, expression};
use crate::error::Result;
use crate::schema::{
    AttributeKind, CtyType, NestedAttributeType, NestingMode, SchemaAttribute, SchemaBlock,
};
use crate::value::{AttrValue, AttributeMap};
use hcl::{Block, Expression, Object, ObjectKey};
use tracing::{debug, warn};

/// Writes projected resources as `resource` blocks, attribute by attribute
/// as the provider schema lists them.
#[derive(Debug, Clone, Default)]
pub struct SchemaSerializer {
    account_id: Option<String>,
}

impl SchemaSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `account_id` attributes with the exported account
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Build `resource "<type>" "<name>" { ... }`.
    ///
    /// Attributes come first in sorted order, then nested blocks, then
    /// `depends_on`. `id` and computed-only attributes are never written.
    pub fn serialize(
        &self,
        resource_type: &str,
        name: &str,
        map: &AttributeMap,
        schema: &SchemaBlock,
    ) -> Result<Block> {
        let mut builder = Block::builder("resource")
            .add_label(resource_type)
            .add_label(name);

        for (attribute_name, attribute) in &schema.attributes {
            if attribute_name == "id" || !attribute.is_emittable() {
                continue;
            }
            if attribute_name == "account_id" {
                if let Some(account_id) = &self.account_id {
                    builder = builder.add_attribute((
                        attribute_name.as_str(),
                        account_expression(account_id, attribute),
                    ));
                    continue;
                }
            }
            if let Some(expr) = self.attribute(resource_type, attribute_name, attribute, map)? {
                builder = builder.add_attribute((attribute_name.as_str(), expr));
            }
        }

        builder = builder.add_blocks(self.nested_blocks(map, schema)?);

        if let Some(AttrValue::List(dependencies)) = map.get("depends_on") {
            let mut references = Vec::with_capacity(dependencies.len());
            for dependency in dependencies {
                references.push(expression(dependency)?);
            }
            if !references.is_empty() {
                builder = builder.add_attribute(("depends_on", Expression::Array(references)));
            }
        }

        Ok(builder.build())
    }

    fn attribute(
        &self,
        resource_type: &str,
        name: &str,
        attribute: &SchemaAttribute,
        map: &AttributeMap,
    ) -> Result<Option<Expression>> {
        let Some(value) = map.get(name) else {
            return Ok(None);
        };

        match attribute.kind() {
            AttributeKind::Primitive | AttributeKind::Collection | AttributeKind::Object => {
                attribute_expression(name, value)
            }
            AttributeKind::Nested => match &attribute.nested_type {
                Some(nested) => self.nested_attribute(resource_type, name, nested, value),
                None => attribute_expression(name, value),
            },
            kind @ (AttributeKind::Tuple | AttributeKind::Dynamic) => {
                if !value.is_null() {
                    warn!(
                        "{}.{} has unsupported kind {:?}, skipping it",
                        resource_type, name, kind
                    );
                }
                Ok(None)
            }
        }
    }

    /// A nested attribute written through its own schema, as an object, a
    /// list of objects or a map of objects depending on its nesting mode
    fn nested_attribute(
        &self,
        resource_type: &str,
        name: &str,
        nested: &NestedAttributeType,
        value: &AttrValue,
    ) -> Result<Option<Expression>> {
        let mode = nested.nesting_mode.unwrap_or(NestingMode::Single);
        match (mode, value) {
            (_, AttrValue::Null) => Ok(None),
            (NestingMode::Single | NestingMode::Group, AttrValue::Map(entry)) => {
                Ok(Some(self.nested_object(resource_type, nested, entry)?))
            }
            (NestingMode::List | NestingMode::Set, AttrValue::List(items)) => {
                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    if let AttrValue::Map(entry) = item {
                        objects.push(self.nested_object(resource_type, nested, entry)?);
                    }
                }
                Ok((!objects.is_empty()).then_some(Expression::Array(objects)))
            }
            (NestingMode::Map, AttrValue::Map(entries)) => {
                let mut object = Object::new();
                for (label, entry) in entries {
                    if let AttrValue::Map(entry) = entry {
                        object.insert(
                            ObjectKey::from(label.as_str()),
                            self.nested_object(resource_type, nested, entry)?,
                        );
                    }
                }
                Ok(Some(Expression::Object(object)))
            }
            (mode, _) => {
                warn!(
                    "{}.{} does not hold {:?} nested values, skipping it",
                    resource_type, name, mode
                );
                Ok(None)
            }
        }
    }

    /// Settable attributes of one nested object
    fn nested_object(
        &self,
        resource_type: &str,
        nested: &NestedAttributeType,
        map: &AttributeMap,
    ) -> Result<Expression> {
        let mut object = Object::new();
        for (attribute_name, attribute) in &nested.attributes {
            if !attribute.is_settable() {
                continue;
            }
            if let Some(expr) = self.attribute(resource_type, attribute_name, attribute, map)? {
                object.insert(ObjectKey::from(attribute_name.as_str()), expr);
            }
        }
        Ok(Expression::Object(object))
    }

    /// Child blocks for every `block_types` entry present in `map`
    fn nested_blocks(&self, map: &AttributeMap, schema: &SchemaBlock) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        for (block_name, nested) in &schema.block_types {
            let Some(value) = map.get(block_name) else {
                continue;
            };

            let entries: Vec<(Option<&str>, &AttributeMap)> = match value {
                AttrValue::Map(entries) if nested.nesting_mode == NestingMode::Map => entries
                    .iter()
                    .filter_map(|(label, entry)| match entry {
                        AttrValue::Map(entry) => Some((Some(label.as_str()), entry)),
                        _ => None,
                    })
                    .collect(),
                AttrValue::Map(entry) => vec![(None, entry)],
                AttrValue::List(items) => items
                    .iter()
                    .filter_map(|item| match item {
                        AttrValue::Map(entry) => Some((None, entry)),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };

            if !nested.nesting_mode.is_repeated() && entries.len() > 1 {
                debug!("{} holds {} entries, writing the first", block_name, entries.len());
            }
            let limit = if nested.nesting_mode.is_repeated() {
                entries.len()
            } else {
                1
            };

            for (label, entry) in entries.into_iter().take(limit) {
                if let Some(block) = self.nested_block(block_name, label, entry, &nested.block)? {
                    blocks.push(block);
                }
            }
        }
        Ok(blocks)
    }

    /// A nested block holding only settable attributes, or `None` when empty
    fn nested_block(
        &self,
        name: &str,
        label: Option<&str>,
        map: &AttributeMap,
        schema: &SchemaBlock,
    ) -> Result<Option<Block>> {
        let mut builder = Block::builder(name);
        if let Some(label) = label {
            builder = builder.add_label(label);
        }

        let mut empty = true;
        for (attribute_name, attribute) in &schema.attributes {
            if !attribute.is_settable() {
                continue;
            }
            if let Some(expr) = self.attribute(name, attribute_name, attribute, map)? {
                builder = builder.add_attribute((attribute_name.as_str(), expr));
                empty = false;
            }
        }

        let children = self.nested_blocks(map, schema)?;
        if empty && children.is_empty() {
            return Ok(None);
        }
        Ok(Some(builder.add_blocks(children).build()))
    }
}

/// `account_id` as a number when the schema types it so
fn account_expression(account_id: &str, attribute: &SchemaAttribute) -> Expression {
    match (&attribute.attribute_type, account_id.parse::<i64>()) {
        (Some(CtyType::Number), Ok(id)) => Expression::Number(hcl::Number::from(id)),
        _ => Expression::String(account_id.to_string()),
    }
}
