//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;
pub use crate::logger::LogLevel;

/// Pickup point reception service
#[derive(Parser, Debug)]
#[command(name = "pvz-service")]
#[command(about = "HTTP service for pickup point goods reception")]
#[command(long_about = "
pvz-service registers pickup points, tracks goods receptions and the
products accepted within them, and issues role-based access tokens.

EXAMPLES:
    # Start the server with default configuration
    pvz-service serve

    # Start server on all interfaces
    pvz-service serve --host 0.0.0.0 --port 8080

    # Use a custom configuration file
    pvz-service --config /etc/pvz/config.toml serve

    # Check configuration without starting the server
    pvz-service serve --dry-run

    # Apply or preview database migrations
    pvz-service migrate
    pvz-service migrate --dry-run

    # Revert the last migration
    pvz-service migrate --rollback 1
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is read; defaults to `PVZ_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override; wins over --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of most recent migrations to revert (1-100)
        #[arg(long, value_name = "STEPS", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["pvz-service", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["pvz-service"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "pvz-service",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level",
            "warning",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                dry_run,
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert_eq!(log_level, Some(LogLevel::Warn));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_migrate_rollback() {
        let cli = Cli::try_parse_from(["pvz-service", "migrate", "--rollback", "2"]).unwrap();
        match cli.command {
            Some(Commands::Migrate { dry_run, rollback }) => {
                assert!(!dry_run);
                assert_eq!(rollback, Some(2));
            }
            other => panic!("Expected Migrate command, got {:?}", other),
        }
    }

    #[test]
    fn test_migrate_dry_run_conflicts_with_rollback() {
        let err = Cli::try_parse_from(["pvz-service", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["pvz-service", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_env_alias_maps_to_config_environment() {
        let cli = Cli::try_parse_from(["pvz-service", "--env", "prod"]).unwrap();
        let env: crate::config::Environment = cli.env.unwrap().into();
        assert_eq!(env, crate::config::Environment::Production);
    }
}
