//! Execution engine module
//!
//! Runs the generate and import passes over the selected resource types.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Engine` - fetch, project, link and serialize each type in order
//! - `RunConfig` - selected types, link set and output switches
//! - `RunContext` - memoized raw records, sibling cache, secret registry and
//!   generated instances shared by every pass of a run
//!
//! Each resource type is processed to completion before the next one. The
//! raw records of a type are fetched at most once per run, so `genimport`
//! issues the same requests as `generate` alone. Link targets are fetched
//! whenever they are linked, whether or not they are generated themselves.

mod types;

pub use types::{GeneratedInstances, RunConfig, RunContext, RunStats};

use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::import::ImportAddressBuilder;
use crate::link::{LinkOutcome, ReferenceLinker};
use crate::naming::ResourceNamer;
use crate::projectors::{ProjectionContext, ProjectorRegistry, ResourceProjector, JOB};
use crate::schema::ProviderSchema;
use crate::serializer::{ConfigDocument, SchemaSerializer};
use crate::value::RawResource;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Orchestrates one run against a dbt Cloud account
pub struct Engine {
    client: DbtCloudClient,
    filter: ProjectFilter,
    registry: ProjectorRegistry,
    config: RunConfig,
    context: RunContext,
    stats: RunStats,
}

impl Engine {
    /// Create an engine exporting every project
    pub fn new(client: DbtCloudClient, registry: ProjectorRegistry) -> Self {
        Self {
            client,
            filter: ProjectFilter::all(),
            registry,
            config: RunConfig::default(),
            context: RunContext::default(),
            stats: RunStats::default(),
        }
    }

    /// Restrict project-scoped types to some projects
    #[must_use]
    pub fn with_filter(mut self, filter: ProjectFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the run configuration, starting a fresh run context
    #[must_use]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.context = RunContext::new(config.secret_mode);
        self.config = config;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    fn namer(&self) -> ResourceNamer {
        ResourceNamer::new(self.config.static_names)
    }

    /// Resource blocks for the selected types, followed by the variable,
    /// locals and tfvars sections
    pub async fn generate(&mut self, schema: &ProviderSchema) -> Result<String> {
        let selected = self.config.selected_types(&self.registry);
        info!("Generating {} resource types", selected.len());

        let mut document = ConfigDocument::new();
        for resource_type in &selected {
            self.generate_type(resource_type, schema, &mut document).await?;
        }

        document.push_variables(self.context.secrets.variables())?;
        if self.config.parameterize_jobs && selected.iter().any(|t| t == JOB) {
            document.push_job_locals()?;
        }
        document.push_tfvars_template(self.context.secrets.variables());

        info!(
            "Generated {} resources ({} skipped)",
            self.stats.resources, self.stats.skipped
        );
        Ok(document.render())
    }

    /// Import statements for the selected types
    pub async fn import(&mut self) -> Result<String> {
        self.import_statements(false).await
    }

    /// `generate`, a blank line, then the imports of the resources it wrote
    pub async fn genimport(&mut self, schema: &ProviderSchema) -> Result<String> {
        let config = self.generate(schema).await?;
        let imports = self.import_statements(true).await?;
        Ok(match (config.is_empty(), imports.is_empty()) {
            (true, _) => imports,
            (false, true) => config,
            (false, false) => format!("{config}\n{imports}"),
        })
    }

    async fn import_statements(&mut self, only_generated: bool) -> Result<String> {
        let selected = self.config.selected_types(&self.registry);
        let builder = ImportAddressBuilder::new(self.config.import_style, self.namer());

        let mut statements = Vec::new();
        for resource_type in &selected {
            let Some(projector) = self.registry.get(resource_type) else {
                warn!("Resource type {} is not supported, skipping it", resource_type);
                self.stats.add_unsupported();
                continue;
            };
            let records =
                load_records(&self.client, &self.filter, projector, &mut self.context.records).await?;

            for raw in records {
                let Some(instance_id) = included_instance(projector, raw)? else {
                    self.stats.add_skipped();
                    continue;
                };
                if only_generated && !self.context.generated.contains(resource_type, &instance_id) {
                    debug!(
                        "No resource block for {} {}, not importing it",
                        resource_type, instance_id
                    );
                    continue;
                }
                statements.push(builder.build(resource_type, &instance_id, raw)?);
                self.stats.add_import();
            }
        }

        info!("Generated {} import statements", self.stats.imports);
        if statements.is_empty() {
            return Ok(String::new());
        }
        let mut text = statements.join("\n");
        text.push('\n');
        Ok(text)
    }

    async fn generate_type(
        &mut self,
        resource_type: &str,
        schema: &ProviderSchema,
        document: &mut ConfigDocument,
    ) -> Result<()> {
        let Some(links_to) = self.registry.get(resource_type).map(|p| p.links_to()) else {
            warn!("Resource type {} is not supported, skipping it", resource_type);
            self.stats.add_unsupported();
            return Ok(());
        };
        let Some(block_schema) = schema.resource(resource_type) else {
            warn!("No provider schema for {}, skipping it", resource_type);
            self.stats.add_unsupported();
            return Ok(());
        };

        self.populate_siblings(links_to).await?;

        let namer = self.namer();
        let serializer = SchemaSerializer::new().with_account_id(self.client.account_id());
        let projector = self.registry.require(resource_type)?;
        let records = load_records(&self.client, &self.filter, projector, &mut self.context.records).await?;
        let linker = ReferenceLinker::new(&self.context.siblings, &self.config.linked, namer);

        let mut written = 0;
        for raw in records {
            let Some(instance_id) = included_instance(projector, raw)? else {
                self.stats.add_skipped();
                continue;
            };

            let mut ctx = ProjectionContext::new(
                &mut self.context.secrets,
                self.client.deploy_url(),
                self.client.account_id(),
            )
            .with_parameterized_jobs(self.config.parameterize_jobs);

            let mut projection = match projector.project(raw, &mut ctx) {
                Ok(projection) => projection,
                Err(e) if e.is_per_record() => {
                    warn!("Skipping {} {}: {}", resource_type, instance_id, e);
                    self.stats.add_skipped();
                    continue;
                }
                Err(e) => return Err(e),
            };

            if linker.link(&mut projection.attributes, &projection.links) == LinkOutcome::Skip {
                debug!(
                    "Skipping {} {}: no linked target left",
                    resource_type, projection.instance_id
                );
                self.stats.add_skipped();
                continue;
            }

            let block = serializer.serialize(
                resource_type,
                &namer.name(&projection.instance_id),
                &projection.attributes,
                block_schema,
            )?;
            document.push_block(&block)?;
            self.context.generated.insert(resource_type, &projection.instance_id);
            self.stats.add_resource();
            written += 1;
        }

        if namer.is_static() && written > 1 {
            warn!(
                "{} instances of {} share the static name {}",
                written,
                resource_type,
                namer.name("")
            );
        }
        debug!("Wrote {} {} resources", written, resource_type);
        Ok(())
    }

    /// Fill the sibling cache for the linked targets of a type
    async fn populate_siblings(&mut self, targets: &[&str]) -> Result<()> {
        for target in targets {
            if !self.config.linked.allows(target) || self.context.siblings.has_type(target) {
                continue;
            }
            let Some(projector) = self.registry.get(target) else {
                continue;
            };

            let records = load_records(&self.client, &self.filter, projector, &mut self.context.records).await?;
            self.context.siblings.ensure_type(target);
            let mut cached = 0;
            for raw in records {
                if let Some(instance_id) = included_instance(projector, raw)? {
                    self.context.siblings.insert(target, instance_id, raw.clone());
                    cached += 1;
                }
            }
            debug!("Cached {} {} instances for linking", cached, target);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("account_id", &self.client.account_id())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Raw records of a type, fetched on first use
async fn load_records<'c>(
    client: &DbtCloudClient,
    filter: &ProjectFilter,
    projector: &dyn ResourceProjector,
    records: &'c mut HashMap<String, Vec<RawResource>>,
) -> Result<&'c [RawResource]> {
    let resource_type = projector.resource_type();
    if !records.contains_key(resource_type) {
        let fetched = projector.fetch(client, filter).await?;
        debug!("Fetched {} raw {} records", fetched.len(), resource_type);
        records.insert(resource_type.to_string(), fetched);
    }
    Ok(records.get(resource_type).map(Vec::as_slice).unwrap_or_default())
}

/// Instance id of an exported record, `None` when the record is filtered
/// out or its payload is unusable
fn included_instance(projector: &dyn ResourceProjector, raw: &RawResource) -> Result<Option<String>> {
    let checked = projector
        .include(raw)
        .and_then(|include| include.then(|| projector.instance_id(raw)).transpose());

    match checked {
        Ok(instance_id) => Ok(instance_id),
        Err(e) if e.is_per_record() => {
            warn!("Skipping {} record: {}", projector.resource_type(), e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
