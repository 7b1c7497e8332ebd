//! CLI module for pvz-service
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and migrate operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use crate::config::settings::Settings;
use crate::logger::init_logger;

/// Load the layered configuration and apply CLI overrides.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli)?;
    Ok(merger.merge_cli_args(cli)?)
}

pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    init_logger(settings.logger.clone())
}
