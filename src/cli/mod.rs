//! CLI module
//!
//! Command-line interface for exporting a dbt Cloud account.
//!
//! # Commands
//!
//! - `generate` - Terraform configuration for the selected resource types
//! - `import` - import blocks or `terraform import` commands
//! - `genimport` - both, configuration first
//! - `resource-types` - list supported resource types

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;

#[cfg(test)]
mod tests;
