//! Link configuration and sibling cache

use crate::value::RawResource;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Resource types whose foreign keys are rewritten into references
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkSet {
    #[default]
    None,
    All,
    Only(BTreeSet<String>),
}

impl LinkSet {
    /// Build from the configured list; `all` as first entry links everything
    pub fn from_list<S: AsRef<str>>(types: &[S]) -> Self {
        match types.first().map(AsRef::as_ref) {
            None => Self::None,
            Some("all") => Self::All,
            Some(_) => Self::Only(types.iter().map(|t| t.as_ref().to_string()).collect()),
        }
    }

    pub fn allows(&self, resource_type: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(types) => types.contains(resource_type),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Default)]
struct Siblings {
    ids: HashSet<String>,
    records: Vec<(String, RawResource)>,
}

/// Instances of each linked resource type, keyed by instance id.
///
/// A type is fully populated before any record referencing it is linked.
#[derive(Debug, Default)]
pub struct SiblingCache {
    types: HashMap<String, Siblings>,
}

impl SiblingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a type as loaded even when it has no instance
    pub fn ensure_type(&mut self, resource_type: &str) {
        self.types.entry(resource_type.to_string()).or_default();
    }

    pub fn insert(&mut self, resource_type: &str, instance_id: impl Into<String>, raw: RawResource) {
        let siblings = self.types.entry(resource_type.to_string()).or_default();
        let instance_id = instance_id.into();
        siblings.ids.insert(instance_id.clone());
        siblings.records.push((instance_id, raw));
    }

    pub fn has_type(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    pub fn contains(&self, resource_type: &str, instance_id: &str) -> bool {
        self.types
            .get(resource_type)
            .is_some_and(|s| s.ids.contains(instance_id))
    }

    /// Cached instances of a type, as (instance id, raw record)
    pub fn records(&self, resource_type: &str) -> impl Iterator<Item = (&str, &RawResource)> + '_ {
        self.types
            .get(resource_type)
            .into_iter()
            .flat_map(|s| s.records.iter().map(|(id, raw)| (id.as_str(), raw)))
    }
}

/// Location of a foreign key in an attribute map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// Top-level attribute
    Top(String),
    /// Field inside a nested object, or inside every object of a nested list
    Nested { parent: String, field: String },
}

impl FieldPath {
    pub fn top(name: impl Into<String>) -> Self {
        Self::Top(name.into())
    }

    pub fn nested(parent: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Nested {
            parent: parent.into(),
            field: field.into(),
        }
    }
}

/// What happens to a foreign key whose target is not in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Keep the literal id. A list is only rewritten when every member resolves.
    KeepLiteral,
    /// Link the members of a list that resolve, keep the others literal
    KeepElement,
    /// Drop unresolved members of a list, null out an unresolved scalar
    DropElement,
    /// Like `DropElement`, skipping the resource when a non-empty list empties
    DropElementOrSkip,
    /// Remove the whole nested object holding the unresolved key
    DropEntry,
}

/// One rewrite applied by the linker
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRule {
    /// Replace an id with `<target>.<name>.<attribute>`
    Reference {
        field: FieldPath,
        target: String,
        attribute: String,
        missing: MissingPolicy,
        /// Nested objects whose boolean field of this name is true are left alone
        unless_flag: Option<String>,
    },
    /// Replace the field with explanatory text when any gating type is linked
    Placeholder {
        field: String,
        text: String,
        gated_by: Vec<String>,
    },
    /// Add `depends_on` entries for cached targets in `project_id` named in `names`
    DependsOn {
        target: String,
        project_id: i64,
        names: Vec<String>,
    },
}

impl LinkRule {
    /// Top-level reference keeping the literal when the target is missing
    pub fn reference(field: &str, target: &str, attribute: &str) -> Self {
        Self::Reference {
            field: FieldPath::top(field),
            target: target.to_string(),
            attribute: attribute.to_string(),
            missing: MissingPolicy::KeepLiteral,
            unless_flag: None,
        }
    }

    /// Reference with an explicit path and missing-target policy
    pub fn reference_at(
        field: FieldPath,
        target: &str,
        attribute: &str,
        missing: MissingPolicy,
    ) -> Self {
        Self::Reference {
            field,
            target: target.to_string(),
            attribute: attribute.to_string(),
            missing,
            unless_flag: None,
        }
    }

    pub fn placeholder(field: &str, text: impl Into<String>, gated_by: &[&str]) -> Self {
        Self::Placeholder {
            field: field.to_string(),
            text: text.into(),
            gated_by: gated_by.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Resource types this rule may point at
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Reference { target, .. } | Self::DependsOn { target, .. } => vec![target],
            Self::Placeholder { gated_by, .. } => gated_by.iter().map(String::as_str).collect(),
        }
    }
}

/// Result of linking one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Keep,
    /// The resource no longer makes sense on its own and is not emitted
    Skip,
}
