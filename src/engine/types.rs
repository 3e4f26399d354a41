//! Engine types
//!
//! Run configuration, run context and statistics.

use crate::import::ImportStyle;
use crate::link::{LinkSet, SiblingCache};
use crate::projectors::ProjectorRegistry;
use crate::secrets::{SecretMode, SecretRegistry};
use crate::value::RawResource;
use std::collections::{HashMap, HashSet};

/// What a run generates and how
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Requested resource types, `all` for every supported type
    pub resource_types: Vec<String>,
    /// Types removed from the requested list
    pub exclude_resource_types: Vec<String>,
    /// Target types whose ids are rewritten into references
    pub linked: LinkSet,
    /// Shape of import statements
    pub import_style: ImportStyle,
    /// Name every instance `terraform_managed_resource`
    pub static_names: bool,
    /// Write job triggers through `local.deactivate_jobs_*`
    pub parameterize_jobs: bool,
    /// Secret fields as variables or as a placeholder
    pub secret_mode: SecretMode,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resource_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.resource_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn exclude<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.exclude_resource_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn linked(mut self, linked: LinkSet) -> Self {
        self.linked = linked;
        self
    }

    #[must_use]
    pub fn import_style(mut self, style: ImportStyle) -> Self {
        self.import_style = style;
        self
    }

    #[must_use]
    pub fn static_names(mut self, enabled: bool) -> Self {
        self.static_names = enabled;
        self
    }

    #[must_use]
    pub fn parameterize_jobs(mut self, enabled: bool) -> Self {
        self.parameterize_jobs = enabled;
        self
    }

    #[must_use]
    pub fn secret_mode(mut self, mode: SecretMode) -> Self {
        self.secret_mode = mode;
        self
    }

    /// Requested types in order, `all` expanded to the registry, excludes removed
    pub fn selected_types(&self, registry: &ProjectorRegistry) -> Vec<String> {
        let requested: Vec<String> = if self.resource_types.iter().any(|t| t == "all") {
            registry
                .resource_types()
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            self.resource_types.clone()
        };

        let mut selected: Vec<String> = Vec::with_capacity(requested.len());
        for resource_type in requested {
            if self.exclude_resource_types.contains(&resource_type) || selected.contains(&resource_type) {
                continue;
            }
            selected.push(resource_type);
        }
        selected
    }
}

/// State shared by every pass of one run
#[derive(Debug, Default)]
pub struct RunContext {
    /// Raw records per resource type, fetched at most once
    pub records: HashMap<String, Vec<RawResource>>,
    /// Linked target instances
    pub siblings: SiblingCache,
    /// Secret variables registered while projecting
    pub secrets: SecretRegistry,
    /// Instances written as resource blocks
    pub generated: GeneratedInstances,
}

impl RunContext {
    pub fn new(secret_mode: SecretMode) -> Self {
        Self {
            records: HashMap::new(),
            siblings: SiblingCache::new(),
            secrets: SecretRegistry::new(secret_mode),
            generated: GeneratedInstances::default(),
        }
    }
}

/// Instance ids that got a resource block, per type
#[derive(Debug, Default)]
pub struct GeneratedInstances {
    by_type: HashMap<String, HashSet<String>>,
}

impl GeneratedInstances {
    pub fn insert(&mut self, resource_type: &str, instance_id: &str) {
        self.by_type
            .entry(resource_type.to_string())
            .or_default()
            .insert(instance_id.to_string());
    }

    pub fn contains(&self, resource_type: &str, instance_id: &str) -> bool {
        self.by_type
            .get(resource_type)
            .is_some_and(|ids| ids.contains(instance_id))
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Resource blocks written
    pub resources: usize,
    /// Records skipped by the linker or because of a bad payload
    pub skipped: usize,
    /// Import statements written
    pub imports: usize,
    /// Resource types not generated at all
    pub unsupported_types: usize,
}

impl RunStats {
    pub fn add_resource(&mut self) {
        self.resources += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_import(&mut self) {
        self.imports += 1;
    }

    pub fn add_unsupported(&mut self) {
        self.unsupported_types += 1;
    }
}
