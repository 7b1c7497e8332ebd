//! Logger configuration, deserialized directly from the `[logger]` table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::LoggerError;

/// Minimum severity that reaches any output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format used by the file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    #[default]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colours; ignored when stdout is not a terminal
    pub colored: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Truncate the file on startup when `false`
    pub append: bool,
    pub format: LogFormat,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/pvz-service.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl LoggerConfig {
    /// Checks the combinations serde cannot express.
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.file.enabled && self.file.path.as_os_str().is_empty() {
            return Err(LoggerError::invalid(
                "file.path",
                "File path is required when file logging is enabled",
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::invalid(
                "console.enabled",
                "At least one output (console or file) must be enabled",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_both_outputs_disabled() {
        let config = LoggerConfig {
            console: ConsoleConfig {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        match config.validate() {
            Err(LoggerError::InvalidSetting { key, .. }) => assert_eq!(key, "console.enabled"),
            other => panic!("Expected InvalidSetting, got {:?}", other),
        }
    }

    #[test]
    fn test_enabled_file_needs_path() {
        let config = LoggerConfig {
            file: FileConfig {
                enabled: true,
                path: PathBuf::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        match config.validate() {
            Err(LoggerError::InvalidSetting { key, .. }) => assert_eq!(key, "file.path"),
            other => panic!("Expected InvalidSetting, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: LoggerConfig = toml::from_str(
            r#"
            level = "warning"

            [file]
            enabled = true
            format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.console.enabled);
        assert_eq!(config.file.format, LogFormat::Compact);
        assert_eq!(config.file.path, PathBuf::from("logs/pvz-service.log"));
    }

    #[test]
    fn test_unknown_level_and_format_rejected() {
        assert!(toml::from_str::<LoggerConfig>(r#"level = "loud""#).is_err());
        assert!(toml::from_str::<LoggerConfig>("[file]\nformat = \"xml\"").is_err());
    }
}
