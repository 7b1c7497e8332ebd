//! HTTP server startup and graceful shutdown.

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, settings::Settings};
use crate::db::{establish_async_connection_pool, migrations};
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::telemetry;

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs until Ctrl+C or SIGTERM, then drains in-flight requests.
    ///
    /// Fails before binding when the JWT section is invalid, when
    /// auto-migration fails, or when the pool cannot be created.
    pub async fn run(self) -> anyhow::Result<()> {
        let Settings {
            application,
            server,
            database,
            jwt,
            ..
        } = self.settings;

        tracing::info!(
            app = %application.name,
            version = %application.version,
            environment = %Environment::from_env(),
            address = %server.address(),
            request_timeout_secs = server.request_timeout,
            pool_max = database.max_connections,
            auto_migrate = database.auto_migrate,
            token_ttl_hours = jwt.token_expiration,
            "Starting pickup point service"
        );

        jwt.validate().context("JWT configuration is invalid")?;

        if database.auto_migrate {
            let applied = migrations::run_pending_migrations(&database.url).await?;
            tracing::info!(count = applied.len(), "Pending migrations applied");
        }

        let metrics = telemetry::install_recorder().context("Failed to install metrics recorder")?;
        telemetry::spawn_upkeep(metrics.clone(), METRICS_UPKEEP_INTERVAL);

        let pool = establish_async_connection_pool(&database).await?;
        let state = AppState::new(Repositories::new(pool), jwt).with_metrics(metrics);
        let router = create_router(state, server.request_timeout);

        let address = server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind to {address}"))?;
        tracing::info!(%address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal = received, "Shutting down gracefully");
}
