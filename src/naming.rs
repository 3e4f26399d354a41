//! Resource instance names
//!
//! Names are derived from the instance id so that regenerating an account
//! produces the same addresses.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix of every generated instance name
pub const NAME_PREFIX: &str = "terraform_managed_resource";

/// Runs of characters that are not valid in a Terraform identifier
static INVALID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").unwrap());

/// Replace every run of invalid identifier characters with `_`
pub fn sanitize(raw: &str) -> String {
    INVALID_CHARS.replace_all(raw, "_").into_owned()
}

/// Builds instance names, addresses and references
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceNamer {
    static_names: bool,
}

impl ResourceNamer {
    pub fn new(static_names: bool) -> Self {
        Self { static_names }
    }

    pub fn is_static(&self) -> bool {
        self.static_names
    }

    /// Instance name for the resource with `instance_id`
    pub fn name(&self, instance_id: &str) -> String {
        if self.static_names {
            NAME_PREFIX.to_string()
        } else {
            sanitize(&format!("{NAME_PREFIX}_{instance_id}"))
        }
    }

    /// `<type>.<name>`
    pub fn address(&self, resource_type: &str, instance_id: &str) -> String {
        format!("{resource_type}.{}", self.name(instance_id))
    }

    /// `<type>.<name>.<attribute>`
    pub fn reference(&self, resource_type: &str, instance_id: &str, attribute: &str) -> String {
        format!("{}.{attribute}", self.address(resource_type, instance_id))
    }
}
