//! Where the provider schema comes from

use super::types::ProviderSchemas;
use crate::error::{Error, Result, ResultExt};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Something that can produce the provider schema document
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> Result<ProviderSchemas>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Schema JSON previously saved to a file
#[derive(Debug, Clone)]
pub struct JsonFileSchema {
    path: PathBuf,
}

impl JsonFileSchema {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SchemaSource for JsonFileSchema {
    async fn load(&self) -> Result<ProviderSchemas> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::FileNotFound {
                    path: self.path.display().to_string(),
                },
                _ => Error::Io(e),
            })?;
        ProviderSchemas::from_json(&content)
    }

    fn describe(&self) -> String {
        format!("schema file {}", self.path.display())
    }
}

/// Runs `terraform providers schema -json` in an initialised working directory
#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl TerraformCli {
    pub fn new(binary: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command_line(&self) -> String {
        format!("{} providers schema -json", self.binary.display())
    }
}

#[async_trait]
impl SchemaSource for TerraformCli {
    async fn load(&self) -> Result<ProviderSchemas> {
        debug!(
            "Reading provider schema with {} in {}",
            self.binary.display(),
            self.working_dir.display()
        );

        let output = Command::new(&self.binary)
            .args(["providers", "schema", "-json"])
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|e| Error::SchemaCommand {
                command: self.command_line(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::SchemaCommand {
                command: self.command_line(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("output of {}", self.command_line()))
    }

    fn describe(&self) -> String {
        self.command_line()
    }
}
