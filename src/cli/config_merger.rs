//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments override file and environment values.

use super::parser::{Cli, Commands, LogLevel};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration honoring `--config` and `--env`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        Ok(Self::new(loader.load()?))
    }

    /// Apply CLI overrides on top of the base configuration and re-validate.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = LogLevel::Debug;
        } else if cli.quiet {
            config.logger.level = LogLevel::Error;
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host_addr) = host {
                config.server.host = host_addr.clone();
            }
            if let Some(port_num) = port {
                config.server.port = *port_num;
            }
            if let Some(level) = log_level {
                config.logger.level = *level;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merger() -> ConfigurationMerger {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/pvz".to_string();
        ConfigurationMerger::new(config)
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        merger().merge_cli_args(&cli).unwrap()
    }

    #[test]
    fn test_merge_verbose_and_quiet_flags() {
        assert_eq!(merge(&["pvz-service", "--verbose"]).logger.level, LogLevel::Debug);
        assert_eq!(merge(&["pvz-service", "--quiet"]).logger.level, LogLevel::Error);
        assert_eq!(merge(&["pvz-service"]).logger.level, LogLevel::Info);
    }

    #[test]
    fn test_merge_serve_host_and_port() {
        let merged = merge(&["pvz-service", "serve", "--host", "0.0.0.0", "--port", "9090"]);
        assert_eq!(merged.server.address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["pvz-service", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(merged.logger.level, LogLevel::Warn);
    }

    #[test]
    fn test_migrate_leaves_server_untouched() {
        let merged = merge(&["pvz-service", "migrate"]);
        assert_eq!(&merged.server, &merger().config().server);
    }

    #[test]
    fn test_merge_revalidates() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(["pvz-service"]).unwrap();
        assert!(merger.merge_cli_args(&cli).is_err());
    }
}
