//! CLI commands and argument parsing

use crate::config::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate Terraform configuration and import blocks for a dbt Cloud account
#[derive(Parser, Debug)]
#[command(name = "dbtcloud-terraforming")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// dbt Cloud account ID
    #[arg(short, long, global = true, env = "DBT_CLOUD_ACCOUNT_ID")]
    pub account: Option<String>,

    /// API token
    #[arg(short, long, global = true, env = "DBT_CLOUD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Host URL to query the API, including the /api part [default: https://cloud.getdbt.com/api]
    #[arg(long, global = true, env = "DBT_CLOUD_HOST_URL")]
    pub host_url: Option<String>,

    /// Project IDs to limit the export to; all projects when not set
    #[arg(short, long, global = true, env = "DBT_CLOUD_PROJECTS", value_delimiter = ',')]
    pub projects: Vec<i64>,

    /// Resource types to generate, `all` for every supported type
    #[arg(long, global = true, value_delimiter = ',')]
    pub resource_types: Vec<String>,

    /// Resource types to leave out, to be used with `--resource-types all`
    #[arg(long, global = true, value_delimiter = ',')]
    pub exclude_resource_types: Vec<String>,

    /// Resource types to reference instead of writing their IDs, `all` for every type
    #[arg(long, global = true, value_delimiter = ',')]
    pub linked_resource_types: Vec<String>,

    /// Write `import` blocks (Terraform 1.5+) instead of `terraform import` commands [default: true]
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub modern_import_block: Option<bool>,

    /// Switch job triggers through `local.deactivate_jobs_*` [default: false]
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub parameterize_jobs: Option<bool>,

    /// Write secret fields as variables; `--secrets=false` writes a placeholder [default: true]
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub secrets: Option<bool>,

    /// Name every resource `terraform_managed_resource` [default: false]
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub static_names: Option<bool>,

    /// Terraform binary used to read the provider schema [default: terraform]
    #[arg(long, global = true, env = "DBT_CLOUD_TERRAFORM_BINARY_PATH")]
    pub terraform_binary_path: Option<PathBuf>,

    /// Initialised Terraform working directory [default: .]
    #[arg(long, global = true, env = "DBT_CLOUD_TERRAFORM_INSTALL_PATH")]
    pub terraform_install_path: Option<PathBuf>,

    /// Provider schema JSON saved from `terraform providers schema -json`
    #[arg(long, global = true)]
    pub schema_file: Option<PathBuf>,

    /// Settings file (YAML) filling options not given on the command line
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Generate Terraform configuration for the selected resources
    Generate,

    /// Generate import blocks or commands for the selected resources
    Import,

    /// Generate the configuration followed by the imports
    Genimport,

    /// List supported resource types
    ResourceTypes,
}

impl Cli {
    /// Settings given on the command line or through the environment
    pub fn settings(&self) -> Settings {
        Settings {
            account_id: self.account.clone(),
            token: self.token.clone(),
            host_url: self.host_url.clone(),
            projects: self.projects.clone(),
            resource_types: self.resource_types.clone(),
            exclude_resource_types: self.exclude_resource_types.clone(),
            linked_resource_types: self.linked_resource_types.clone(),
            modern_import_block: self.modern_import_block,
            parameterize_jobs: self.parameterize_jobs,
            secrets: self.secrets,
            static_names: self.static_names,
            terraform_binary_path: self.terraform_binary_path.clone(),
            terraform_install_path: self.terraform_install_path.clone(),
            schema_file: self.schema_file.clone(),
        }
    }
}
