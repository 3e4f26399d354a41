//! CLI runner - executes commands

use crate::api::DbtCloudClient;
use crate::cli::commands::{Cli, Commands};
use crate::config::Settings;
use crate::engine::Engine;
use crate::error::Result;
use crate::import::import_format;
use crate::output::{write_output, OutputTarget};
use crate::projectors::default_registry;
use crate::schema::{ProviderSchemas, PROVIDER_ADDRESS};
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and write its output
    pub async fn run(&self) -> Result<()> {
        let text = self.execute().await?;
        let target = OutputTarget::from_path(self.cli.output.as_deref());
        write_output(&target, &text).await
    }

    /// Run the CLI command and return its output
    pub async fn execute(&self) -> Result<String> {
        let start = Instant::now();
        let text = match self.cli.command {
            Commands::ResourceTypes => Ok(Self::resource_types()),
            Commands::Generate => {
                let settings = self.settings().await?;
                let mut engine = Self::engine(&settings)?;
                let schemas = Self::load_schema(&settings).await?;
                engine.generate(schemas.provider(PROVIDER_ADDRESS)?).await
            }
            Commands::Import => {
                let settings = self.settings().await?;
                Self::engine(&settings)?.import().await
            }
            Commands::Genimport => {
                let settings = self.settings().await?;
                let mut engine = Self::engine(&settings)?;
                let schemas = Self::load_schema(&settings).await?;
                engine.genimport(schemas.provider(PROVIDER_ADDRESS)?).await
            }
        }?;

        debug!("{:?} finished in {:?}", self.cli.command, start.elapsed());
        Ok(text)
    }

    /// Command-line settings completed by the settings file
    async fn settings(&self) -> Result<Settings> {
        let mut settings = self.cli.settings();
        if let Some(path) = &self.cli.config {
            debug!("Reading settings from {}", path.display());
            settings.fill_from(Settings::load(path).await?);
        }
        Ok(settings)
    }

    fn engine(settings: &Settings) -> Result<Engine> {
        let client = DbtCloudClient::new(
            &settings.host_url()?,
            settings.token()?,
            settings.account_id()?,
        )?;

        Ok(Engine::new(client, default_registry())
            .with_filter(settings.project_filter())
            .with_config(settings.run_config()?))
    }

    async fn load_schema(settings: &Settings) -> Result<ProviderSchemas> {
        let source = settings.schema_source();
        info!("Reading provider schema from {}", source.describe());
        source.load().await
    }

    /// Supported resource types with their import id format
    fn resource_types() -> String {
        let registry = default_registry();
        let mut text = String::new();
        for resource_type in registry.resource_types() {
            let format = import_format(resource_type).unwrap_or("-");
            text.push_str(&format!("{resource_type}\t{format}\n"));
        }
        text
    }
}
