//! Logger module
//!
//! Builds a `tracing-subscriber` registry from [`LoggerConfig`]:
//! - Console output with color control
//! - File output in Full, Compact or JSON format
//! - Fallback to stderr when the log file stops accepting writes

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::LogFileWriter;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` directives, when present, take precedence over `config.level`.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter),
        (false, true) => init_file_only(&config.file, filter),
        // validate() rejects configs with both outputs off
        _ => init_console_only(&config.console, filter),
    }
}

fn console_layer<S>(config: &ConsoleConfig) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let use_ansi = config.colored && std::io::stdout().is_terminal();
    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
}

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(config))
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized {
            message: e.to_string(),
        })?;
    Ok(())
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> anyhow::Result<()> {
    let writer = LogFileWriter::new(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .try_init(),
    };

    result.map_err(|e| LoggerError::AlreadyInitialized {
        message: e.to_string(),
    })?;
    Ok(())
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> anyhow::Result<()> {
    let writer = LogFileWriter::new(&config.file)?;
    let registry = tracing_subscriber::registry().with(filter);

    // The file layer goes first so ANSI escapes from the console layer do not
    // leak into span fields written to the file.
    let result = match config.file.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .with(console_layer(&config.console))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .with(console_layer(&config.console))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .with(console_layer(&config.console))
            .try_init(),
    };

    result.map_err(|e| LoggerError::AlreadyInitialized {
        message: e.to_string(),
    })?;
    Ok(())
}
