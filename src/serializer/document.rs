//! Generated configuration document

use super::expression::reference_expression;
use crate::error::Result;
use crate::secrets::SecretVariable;
use hcl::format::{Format, Formatter};
use hcl::{Block, Expression};

/// Locals switching job triggers off when jobs are parameterized
pub const JOB_LOCALS: [&str; 3] = [
    "deactivate_jobs_pr",
    "deactivate_jobs_schedule",
    "deactivate_jobs_merge",
];

const VARIABLES_HEADER: &str = "# The variables defined for fields we couldn't retrieve";
const LOCALS_HEADER: &str = "# The locals used to activate/deactivate jobs";
const TFVARS_HEADER: &str = "# Copy past the following lines in terraform.tfvars";

/// Format one block with single-line arrays and identifier-like object keys unquoted
pub fn format_block(block: &Block) -> Result<String> {
    let mut formatter = Formatter::builder()
        .compact_arrays(true)
        .prefer_ident_keys(true)
        .build_vec();
    Ok(block.format_string(&mut formatter)?.trim_end().to_string())
}

/// Assembles resource blocks and the trailing variable and locals sections
#[derive(Debug, Default)]
pub struct ConfigDocument {
    parts: Vec<String>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_block(&mut self, block: &Block) -> Result<()> {
        self.parts.push(format_block(block)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `variable` blocks for the registered secrets, followed later by a
    /// commented tfvars template
    pub fn push_variables(&mut self, variables: &[SecretVariable]) -> Result<()> {
        if variables.is_empty() {
            return Ok(());
        }
        self.parts.push(VARIABLES_HEADER.to_string());
        for variable in variables {
            let block = Block::builder("variable")
                .add_label(variable.name.as_str())
                .add_attribute(("type", reference_expression("string")?))
                .add_attribute(("description", variable.description.as_str()))
                .build();
            self.push_block(&block)?;
        }
        Ok(())
    }

    /// `locals` block with every job switch off
    pub fn push_job_locals(&mut self) -> Result<()> {
        self.parts.push(LOCALS_HEADER.to_string());
        let mut builder = Block::builder("locals");
        for local in JOB_LOCALS {
            builder = builder.add_attribute((local, Expression::Bool(false)));
        }
        self.push_block(&builder.build())
    }

    /// `# <name> = ""` lines to paste into `terraform.tfvars`
    pub fn push_tfvars_template(&mut self, variables: &[SecretVariable]) {
        if variables.is_empty() {
            return;
        }
        self.parts.push(TFVARS_HEADER.to_string());
        let lines: Vec<String> = variables
            .iter()
            .map(|variable| format!("# {} = \"\"", variable.name))
            .collect();
        self.parts.push(lines.join("\n"));
    }

    /// Parts separated by a blank line, ending with a newline
    pub fn render(&self) -> String {
        if self.parts.is_empty() {
            return String::new();
        }
        let mut text = self.parts.join("\n\n");
        text.push('\n');
        text
    }
}
