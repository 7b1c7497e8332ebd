//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::JwtConfig;
use crate::repositories::{HealthProbe, Repositories};
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since every service holds `Arc` repository handles.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Storage reachability check used by the readiness probe
    pub health: Arc<dyn HealthProbe>,
    /// JWT configuration for token generation and validation
    pub jwt_config: JwtConfig,
    /// Prometheus exposition for `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Builds services on top of `repos`.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(Repositories::new(pool), settings.jwt.clone());
    /// ```
    pub fn new(repos: Repositories, jwt_config: JwtConfig) -> Self {
        let health = repos.health.clone();
        Self {
            services: Services::new(repos),
            health,
            jwt_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// State backed by the in-memory store, for tests and local experiments.
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self::new(Repositories::in_memory(), jwt_config)
    }
}
