//! Router configuration for the API.
//!
//! This module provides centralized route registration, OpenAPI document
//! assembly and middleware configuration for the application.

use std::time::Duration;

use axum::{Router, middleware, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers added later wrap the earlier ones, so a request passes through:
/// 1. Compression and CORS
/// 2. Request ID, assigned or propagated
/// 3. Logging, inside a span carrying the request ID
/// 4. Global error handler, normalising non-JSON errors
/// 5. Timeout, bounding the handler by `request_timeout_secs`
///
/// Pickup point, reception and product routes additionally run
/// [`auth_middleware`] once they are matched.
///
/// # Example
/// ```ignore
/// let state = AppState::new(Repositories::new(pool), settings.jwt.clone());
/// let router = create_router(state, settings.server.request_timeout);
/// ```
pub fn create_router(state: AppState, request_timeout_secs: u64) -> Router {
    let protected = OpenApiRouter::new()
        .merge(handlers::pickup_points::pickup_point_routes())
        .merge(handlers::receptions::reception_routes())
        .merge(handlers::products::product_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::health::health_routes())
        .merge(protected)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .route("/metrics", get(handlers::metrics::render_metrics))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
