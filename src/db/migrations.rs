//! Embedded schema migrations.
//!
//! The harness needs a synchronous `PgConnection`, so every entry point runs
//! on the blocking thread pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn migration_error(operation: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("Migration error: {}", e),
    }
}

async fn with_connection<T, F>(database_url: &str, operation: &'static str, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
{
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::anyhow!("Connection error: {}", e),
        })?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}

/// Names of migrations not yet applied.
pub async fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, "check pending migrations", |conn| {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("check pending migrations", e))?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Applies every pending migration and returns the applied versions.
pub async fn run_pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, "run pending migrations", |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("run pending migrations", e))?;
        Ok(applied.iter().map(|v| v.to_string()).collect())
    })
    .await
}

/// Reverts the `steps` most recent migrations.
///
/// # Errors
/// - `Validation` if fewer than `steps` migrations are applied
pub async fn revert_migrations(database_url: &str, steps: u32) -> AppResult<usize> {
    with_connection(database_url, "revert migrations", move |conn| {
        let applied = conn
            .applied_migrations()
            .map_err(|e| migration_error("get applied migrations", e))?;

        if applied.len() < steps as usize {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: format!(
                    "Cannot rollback {} migrations - only {} applied migrations available",
                    steps,
                    applied.len()
                ),
            });
        }

        for _ in 0..steps {
            conn.revert_last_migration(MIGRATIONS)
                .map_err(|e| migration_error("revert migration", e))?;
        }
        Ok(steps as usize)
    })
    .await
}
