//! Error types for dbtcloud-terraforming
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for dbtcloud-terraforming
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Payload Errors
    // ============================================================================
    #[error("Unexpected shape for field '{field}': expected {expected}, found {found}")]
    Shape {
        field: String,
        expected: &'static str,
        found: String,
    },

    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("Provider schema error: {message}")]
    Schema { message: String },

    #[error("`{command}` failed: {message}")]
    SchemaCommand { command: String, message: String },

    // ============================================================================
    // Generation Errors
    // ============================================================================
    #[error("Resource type '{resource_type}' is not supported")]
    UnsupportedResourceType { resource_type: String },

    #[error("{resource_type} does not have an import format defined")]
    MissingImportFormat { resource_type: String },

    #[error("HCL error: {0}")]
    Hcl(#[from] hcl::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Create a payload shape error
    pub fn shape(field: impl Into<String>, expected: &'static str, found: impl Into<String>) -> Self {
        Self::Shape {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an unsupported resource type error
    pub fn unsupported(resource_type: impl Into<String>) -> Self {
        Self::UnsupportedResourceType {
            resource_type: resource_type.into(),
        }
    }

    /// Create a missing import format error
    pub fn missing_import_format(resource_type: impl Into<String>) -> Self {
        Self::MissingImportFormat {
            resource_type: resource_type.into(),
        }
    }

    /// Check if this error only concerns a single record.
    ///
    /// Such errors skip the record instead of aborting the run.
    pub fn is_per_record(&self) -> bool {
        matches!(self, Error::Shape { .. })
    }
}

/// Result type alias for dbtcloud-terraforming
pub type Result<T> = std::result::Result<T, Error>;

/// Adds a description of the failed step to an error
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", message.into(), e.into())))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("token");
        assert_eq!(err.to_string(), "Missing required config field: token");

        let err = Error::http_status(404, "https://cloud.getdbt.com/api/v2", "Not found");
        assert_eq!(
            err.to_string(),
            "HTTP 404 for https://cloud.getdbt.com/api/v2: Not found"
        );

        let err = Error::missing_import_format("dbtcloud_unknown");
        assert_eq!(
            err.to_string(),
            "dbtcloud_unknown does not have an import format defined"
        );
    }

    #[test]
    fn test_shape_error_is_per_record() {
        let err = Error::shape("settings.threads", "number", "string");
        assert!(err.is_per_record());
        assert_eq!(
            err.to_string(),
            "Unexpected shape for field 'settings.threads': expected number, found string"
        );

        assert!(!Error::http_status(500, "u", "").is_per_record());
        assert!(!Error::unsupported("dbtcloud_foo").is_per_record());
    }

    #[test]
    fn test_context_names_the_failed_step() {
        let result: Result<()> = Err(Error::missing_field("token"));
        let err = result.context("loading settings").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading settings: Missing required config field: token"
        );

        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = parsed
            .with_context(|| "output of terraform providers schema -json".to_string())
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("output of terraform providers schema -json: Failed to parse JSON"));
    }
}
