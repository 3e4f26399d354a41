//! Run settings
//!
//! Settings come from command-line flags and `DBT_CLOUD_*` environment
//! variables, optionally completed by a YAML settings file. Values already
//! set on the command line or in the environment win over the file.
//!
//! ```yaml
//! account_id: 1234
//! host_url: https://emea.dbt.com/api
//! projects: [71, 72]
//! resource_types: [all]
//! exclude_resource_types: [dbtcloud_user_groups]
//! linked_resource_types: [all]
//! parameterize_jobs: true
//! ```

use crate::api::{ProjectFilter, DEFAULT_HOST_URL};
use crate::engine::RunConfig;
use crate::error::{Error, Result};
use crate::import::ImportStyle;
use crate::link::LinkSet;
use crate::schema::{JsonFileSchema, SchemaSource, TerraformCli};
use crate::secrets::SecretMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Terraform binary used when no path is configured
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Every setting of a run; `None` and empty lists mean unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// dbt Cloud account id
    #[serde(default, deserialize_with = "id_string")]
    pub account_id: Option<String>,

    /// API token
    #[serde(default)]
    pub token: Option<String>,

    /// API host, including the `/api` suffix
    #[serde(default)]
    pub host_url: Option<String>,

    /// Projects to export; all when empty
    #[serde(default)]
    pub projects: Vec<i64>,

    #[serde(default)]
    pub resource_types: Vec<String>,

    #[serde(default)]
    pub exclude_resource_types: Vec<String>,

    /// Target types written as references instead of ids
    #[serde(default)]
    pub linked_resource_types: Vec<String>,

    /// `import` blocks instead of `terraform import` commands (default true)
    #[serde(default)]
    pub modern_import_block: Option<bool>,

    #[serde(default)]
    pub parameterize_jobs: Option<bool>,

    /// Secret fields as variables; `false` writes a placeholder (default true)
    #[serde(default)]
    pub secrets: Option<bool>,

    #[serde(default)]
    pub static_names: Option<bool>,

    #[serde(default)]
    pub terraform_binary_path: Option<PathBuf>,

    /// Initialised Terraform working directory (default `.`)
    #[serde(default)]
    pub terraform_install_path: Option<PathBuf>,

    /// Saved `terraform providers schema -json` output, used instead of Terraform
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
}

/// Account ids may be written as numbers or strings
fn id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    }))
}

impl Settings {
    /// Parse a YAML settings document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML settings file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read settings file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Fill every unset value from `other`
    pub fn fill_from(&mut self, other: Settings) {
        fn fill<T>(value: &mut Option<T>, other: Option<T>) {
            if value.is_none() {
                *value = other;
            }
        }
        fn fill_list<T>(value: &mut Vec<T>, other: Vec<T>) {
            if value.is_empty() {
                *value = other;
            }
        }

        fill(&mut self.account_id, other.account_id);
        fill(&mut self.token, other.token);
        fill(&mut self.host_url, other.host_url);
        fill_list(&mut self.projects, other.projects);
        fill_list(&mut self.resource_types, other.resource_types);
        fill_list(&mut self.exclude_resource_types, other.exclude_resource_types);
        fill_list(&mut self.linked_resource_types, other.linked_resource_types);
        fill(&mut self.modern_import_block, other.modern_import_block);
        fill(&mut self.parameterize_jobs, other.parameterize_jobs);
        fill(&mut self.secrets, other.secrets);
        fill(&mut self.static_names, other.static_names);
        fill(&mut self.terraform_binary_path, other.terraform_binary_path);
        fill(&mut self.terraform_install_path, other.terraform_install_path);
        fill(&mut self.schema_file, other.schema_file);
    }

    // ============================================================================
    // Resolved values
    // ============================================================================

    pub fn account_id(&self) -> Result<&str> {
        match self.account_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id.trim()),
            _ => Err(Error::missing_field("account")),
        }
    }

    pub fn token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::missing_field("token")),
        }
    }

    /// Configured host URL, validated, without a trailing slash
    pub fn host_url(&self) -> Result<String> {
        let host_url = self
            .host_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_HOST_URL);

        let parsed = Url::parse(host_url)
            .map_err(|e| Error::invalid_value("host_url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "host_url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        Ok(host_url.trim_end_matches('/').to_string())
    }

    pub fn project_filter(&self) -> ProjectFilter {
        if self.projects.is_empty() {
            ProjectFilter::all()
        } else {
            ProjectFilter::new(self.projects.iter().copied())
        }
    }

    /// Engine configuration; at least one resource type is required
    pub fn run_config(&self) -> Result<RunConfig> {
        if self.resource_types.is_empty() {
            return Err(Error::invalid_value(
                "resource_types",
                "at least one resource type is required, or `all`",
            ));
        }

        let import_style = if self.modern_import_block.unwrap_or(true) {
            ImportStyle::Block
        } else {
            ImportStyle::Command
        };
        let secret_mode = if self.secrets.unwrap_or(true) {
            SecretMode::Variables
        } else {
            SecretMode::Placeholder
        };

        Ok(RunConfig::new()
            .resource_types(self.resource_types.iter().cloned())
            .exclude(self.exclude_resource_types.iter().cloned())
            .linked(LinkSet::from_list(&self.linked_resource_types))
            .import_style(import_style)
            .static_names(self.static_names.unwrap_or(false))
            .parameterize_jobs(self.parameterize_jobs.unwrap_or(false))
            .secret_mode(secret_mode))
    }

    /// Where the provider schema is read from
    pub fn schema_source(&self) -> Box<dyn SchemaSource> {
        if let Some(path) = &self.schema_file {
            return Box::new(JsonFileSchema::new(path));
        }
        let binary = self
            .terraform_binary_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TERRAFORM_BINARY));
        let working_dir = self
            .terraform_install_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Box::new(TerraformCli::new(binary, working_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_settings_file() {
        let yaml = r#"
account_id: 1234
token: "dbtc_abc"
projects: [71, 72]
resource_types: [all]
linked_resource_types: [dbtcloud_project]
modern_import_block: false
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.account_id.as_deref(), Some("1234"));
        assert_eq!(settings.projects, vec![71, 72]);
        assert_eq!(settings.modern_import_block, Some(false));
        assert!(settings.secrets.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(
            Settings::from_yaml("acount_id: 1"),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(Settings::from_yaml("\n").unwrap(), Settings::default());
    }

    #[test]
    fn test_flags_win_over_file() {
        let mut settings = Settings {
            account_id: Some("1".to_string()),
            resource_types: vec!["dbtcloud_job".to_string()],
            ..Settings::default()
        };
        settings.fill_from(Settings {
            account_id: Some("2".to_string()),
            token: Some("file-token".to_string()),
            resource_types: vec!["all".to_string()],
            static_names: Some(true),
            ..Settings::default()
        });

        assert_eq!(settings.account_id.as_deref(), Some("1"));
        assert_eq!(settings.token.as_deref(), Some("file-token"));
        assert_eq!(settings.resource_types, vec!["dbtcloud_job".to_string()]);
        assert_eq!(settings.static_names, Some(true));
    }

    #[test]
    fn test_required_values() {
        let settings = Settings::default();
        assert!(matches!(
            settings.account_id(),
            Err(Error::MissingConfigField { .. })
        ));
        assert!(matches!(settings.token(), Err(Error::MissingConfigField { .. })));
        assert!(matches!(
            settings.run_config(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_host_url() {
        let mut settings = Settings::default();
        assert_eq!(settings.host_url().unwrap(), DEFAULT_HOST_URL);

        settings.host_url = Some("https://emea.dbt.com/api/".to_string());
        assert_eq!(settings.host_url().unwrap(), "https://emea.dbt.com/api");

        settings.host_url = Some("not a url".to_string());
        assert!(settings.host_url().is_err());

        settings.host_url = Some("ftp://emea.dbt.com/api".to_string());
        assert!(settings.host_url().is_err());
    }

    #[test]
    fn test_run_config_defaults() {
        let settings = Settings {
            resource_types: vec!["all".to_string()],
            ..Settings::default()
        };
        let config = settings.run_config().unwrap();
        assert_eq!(config.import_style, ImportStyle::Block);
        assert_eq!(config.secret_mode, SecretMode::Variables);
        assert_eq!(config.linked, LinkSet::None);
        assert!(!config.static_names);
        assert!(!config.parameterize_jobs);
        assert!(settings.project_filter().is_all());
    }

    #[test]
    fn test_run_config_switches() {
        let settings = Settings {
            resource_types: vec!["dbtcloud_job".to_string()],
            linked_resource_types: vec!["all".to_string()],
            modern_import_block: Some(false),
            secrets: Some(false),
            parameterize_jobs: Some(true),
            projects: vec![3],
            ..Settings::default()
        };
        let config = settings.run_config().unwrap();
        assert_eq!(config.import_style, ImportStyle::Command);
        assert_eq!(config.secret_mode, SecretMode::Placeholder);
        assert_eq!(config.linked, LinkSet::All);
        assert!(config.parameterize_jobs);
        assert_eq!(settings.project_filter().projects(), &[3]);
    }

    #[test]
    fn test_schema_source() {
        let settings = Settings {
            schema_file: Some(PathBuf::from("schema.json")),
            ..Settings::default()
        };
        assert_eq!(settings.schema_source().describe(), "schema file schema.json");
        assert_eq!(
            Settings::default().schema_source().describe(),
            "terraform providers schema -json"
        );
    }

    #[tokio::test]
    async fn test_load_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "account_id: \"42\"\nsecrets: false").unwrap();

        let settings = Settings::load(file.path()).await.unwrap();
        assert_eq!(settings.account_id().unwrap(), "42");
        assert_eq!(settings.secrets, Some(false));

        assert!(matches!(
            Settings::load("/nonexistent/settings.yaml").await,
            Err(Error::FileNotFound { .. })
        ));
    }
}
