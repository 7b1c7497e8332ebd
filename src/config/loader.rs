//! Layered configuration loading.
//!
//! In directory mode the layers are, lowest precedence first:
//! `default.toml` (required), `{environment}.toml`, `local.toml`, then
//! `PVZ_*` environment variables with `__` between nested keys
//! (`PVZ_DATABASE__URL` sets `database.url`). Pointing `PVZ_CONFIG_FILE`
//! at a file replaces the three file layers with that one file.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "PVZ_CONFIG_DIR";
const CONFIG_FILE_ENV: &str = "PVZ_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "PVZ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Directory(PathBuf),
    SingleFile(PathBuf),
}

#[derive(Debug)]
pub struct ConfigLoader {
    source: Source,
    environment: Environment,
}

impl ConfigLoader {
    /// Reads `PVZ_CONFIG_DIR`, `PVZ_CONFIG_FILE` and `PVZ_APP_ENV`.
    ///
    /// Fails with [`ConfigError::ConflictingSources`] when both location
    /// variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir = std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
        let file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);

        let source = match (dir, file) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingSources),
            (_, Some(file)) => Source::SingleFile(file),
            (dir, None) => {
                Source::Directory(dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)))
            }
        };

        Ok(Self {
            source,
            environment: Environment::from_env(),
        })
    }

    /// Load a single file instead of the layered directory.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Source::SingleFile(path.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Merges every source, deserializes and validates the result.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.builder()?.build()?;
        let settings: Settings = config.try_deserialize().map_err(ConfigError::Deserialize)?;
        settings.validate()?;

        tracing::debug!(
            environment = %self.environment,
            files = ?self.file_layers().iter().map(|(p, _)| p).collect::<Vec<_>>(),
            "Configuration loaded"
        );
        Ok(settings)
    }

    /// File layers in precedence order, each paired with whether it must exist.
    fn file_layers(&self) -> Vec<(PathBuf, bool)> {
        match &self.source {
            Source::SingleFile(path) => vec![(path.clone(), true)],
            Source::Directory(dir) => vec![
                (dir.join("default.toml"), true),
                (dir.join(format!("{}.toml", self.environment)), false),
                (dir.join("local.toml"), false),
            ],
        }
    }

    fn builder(&self) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in self.file_layers() {
            if required && !path.is_file() {
                return Err(ConfigError::FileNotFound { path });
            }
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }

        Ok(builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        ))
    }
}
