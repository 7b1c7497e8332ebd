//! Command executor for dispatching CLI commands

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;

/// Runs the parsed command; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
    }
}
