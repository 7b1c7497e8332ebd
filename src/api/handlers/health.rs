//! Health check endpoint handlers.
//!
//! Used by monitoring and load balancers. The storage check goes straight to
//! the [`HealthProbe`](crate::repositories::HealthProbe) rather than through
//! the services.

use axum::{Json, extract::State, http::StatusCode};
use jiff::Timestamp;
use std::collections::BTreeMap;
use std::time::Instant;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Basic health check
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Basic health check endpoint.
///
/// Reports the application version and the storage check with its latency.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = check_storage(&state).await;
    let status = storage.status;

    let mut checks = BTreeMap::new();
    checks.insert("storage".to_string(), storage);

    let response = HealthResponse {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: Timestamp::now(),
        checks,
    };

    (status.status_code(), Json(response))
}

/// Readiness probe endpoint.
///
/// Ready once the storage answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    check_storage(&state).await.status.status_code()
}

/// Liveness probe endpoint. Does not touch any dependency.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_storage(state: &AppState) -> ComponentHealth {
    let start_time = Instant::now();
    let result = state.health.ping().await;
    let response_time_ms = Some(start_time.elapsed().as_millis() as u64);

    match result {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Storage unavailable".to_string()),
                response_time_ms,
            }
        }
    }
}
