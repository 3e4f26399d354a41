//! Secret redaction
//!
//! Secret fields are never copied from the API. Depending on the run mode
//! they become a `var.<name>` reference backed by a registered variable, or a
//! fixed placeholder text.

use crate::value::AttrValue;
use tracing::debug;

/// Text written in place of a secret when variables are not generated
pub const SECRET_PLACEHOLDER: &str = "---TBD---";

/// How secret fields are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretMode {
    /// `var.<name>` plus a `variable` block
    #[default]
    Variables,
    /// The fixed placeholder text
    Placeholder,
}

/// A variable declared for a secret field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretVariable {
    pub name: String,
    pub description: String,
}

/// Append-only list of secret variables registered during a run
#[derive(Debug, Default)]
pub struct SecretRegistry {
    mode: SecretMode,
    variables: Vec<SecretVariable>,
}

impl SecretRegistry {
    pub fn new(mode: SecretMode) -> Self {
        Self {
            mode,
            variables: Vec::new(),
        }
    }

    pub fn mode(&self) -> SecretMode {
        self.mode
    }

    /// Value to write in place of a secret field.
    ///
    /// In variable mode the variable is registered once per name; later
    /// calls with the same name reuse it.
    pub fn redact(&mut self, name: impl Into<String>, description: impl Into<String>) -> AttrValue {
        match self.mode {
            SecretMode::Placeholder => AttrValue::string(SECRET_PLACEHOLDER),
            SecretMode::Variables => {
                let name = name.into();
                if !self.variables.iter().any(|v| v.name == name) {
                    debug!("Registering secret variable {}", name);
                    self.variables.push(SecretVariable {
                        name: name.clone(),
                        description: description.into(),
                    });
                }
                AttrValue::reference(format!("var.{name}"))
            }
        }
    }

    /// Registered variables in registration order
    pub fn variables(&self) -> &[SecretVariable] {
        &self.variables
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
