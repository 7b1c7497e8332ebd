//! Errors raised while locating, reading and validating configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file (`default.toml` or `PVZ_CONFIG_FILE`) is missing
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The merged sources do not match the `Settings` shape
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(#[source] config::ConfigError),

    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Unknown environment '{0}'. Valid values are: development, test, staging, production")]
    UnknownEnvironment(String),

    /// `PVZ_CONFIG_DIR` and `PVZ_CONFIG_FILE` were both set
    #[error("PVZ_CONFIG_DIR and PVZ_CONFIG_FILE cannot both be set")]
    ConflictingSources,

    /// Source loading failures reported by the config crate
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Dotted key of the offending value, when the error is about one field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::validation("server.port", "Port cannot be 0");
        assert_eq!(
            error.to_string(),
            "Validation error: server.port - Port cannot be 0"
        );
        assert_eq!(error.field(), Some("server.port"));
    }

    #[test]
    fn test_file_not_found_display() {
        let error = ConfigError::FileNotFound {
            path: PathBuf::from("config/default.toml"),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: config/default.toml"
        );
        assert_eq!(error.field(), None);
    }
}
