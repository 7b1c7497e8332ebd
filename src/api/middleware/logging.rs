//! Logging middleware for request/response tracing.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{Instrument, Level, info, span, warn};

use super::RequestId;
use crate::telemetry;

/// Middleware that logs request and response information.
///
/// Runs the rest of the stack inside an `http_request` span carrying the
/// method, path and request ID, and logs status and latency on the way out.
/// Server errors are logged at `warn`. Every response is also counted in the
/// Prometheus HTTP metrics.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = span!(
        Level::INFO,
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    async move {
        info!("Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let elapsed = start.elapsed();
        let duration_ms = elapsed.as_millis() as u64;
        let status = response.status().as_u16();
        telemetry::record_http_request(method.as_str(), &path, status, elapsed);

        if response.status().is_server_error() {
            warn!(status, duration_ms, "Response sent");
        } else {
            info!(status, duration_ms, "Response sent");
        }

        response
    }
    .instrument(span)
    .await
}
