//! Migrate command handler
//!
//! Applies, previews, or reverts the embedded schema migrations.

use crate::config::settings::Settings;
use crate::db::migrations;
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// # Errors
    /// - Database connection or migration errors
    /// - `Validation` for a zero or oversized rollback
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        if rollback == Some(0) {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            });
        }

        self.config.database.validate()?;
        let url = self.config.database.url.as_str();

        if dry_run {
            let pending = migrations::pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations found - database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {}", name);
                }
                println!("\nRun without --dry-run to apply these migrations");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            println!("Rolling back {} migration(s)...", steps);
            let reverted = migrations::revert_migrations(url, steps).await?;
            tracing::warn!(reverted, "Migrations reverted");
            println!("✓ Rolled back {} migration(s)", reverted);
            return Ok(());
        }

        println!("Running database migrations...");
        let applied = migrations::run_pending_migrations(url).await?;
        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {}", version);
            }
        }
        tracing::info!(count = applied.len(), "Migrations applied");
        Ok(())
    }
}
