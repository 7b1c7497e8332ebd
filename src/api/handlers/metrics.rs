//! Prometheus scrape endpoint.
//!
//! Served outside the OpenAPI document and without authentication, like the
//! health probes.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `GET /metrics` in the Prometheus text exposition format.
pub async fn render_metrics(State(state): State<AppState>) -> AppResult<Response> {
    let handle = state.metrics.as_ref().ok_or_else(|| AppError::NotFound {
        entity: "metrics".to_string(),
        field: "recorder".to_string(),
        value: "prometheus".to_string(),
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], handle.render()).into_response())
}
