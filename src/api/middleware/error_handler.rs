//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaves the service as an [`ErrorResponse`] JSON body with a
//! stable code. Failures that never reach a handler (unknown route, wrong
//! method, timeout) are normalised by [`global_error_handler`].

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::api::middleware::RequestId;
use crate::error::AppError;

/// Upper bound on a non-JSON error body that is folded into the message.
const MAX_PLAIN_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - NotFound → 404
    /// - Duplicate, ReceptionAlreadyOpen → 409
    /// - Validation, ValidationErrors, BadRequest → 400
    /// - NoActiveReception, NoProductsInReception → 400
    /// - Unauthorized → 401
    /// - Forbidden → 403
    /// - ConnectionPool → 503
    /// - Database, Configuration, Internal → 500 with a generic message
    fn into_response(self) -> Response {
        error_to_response_with_request_id(self, None)
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::ReceptionAlreadyOpen { .. } => StatusCode::CONFLICT,
        AppError::NoActiveReception { .. } => StatusCode::BAD_REQUEST,
        AppError::NoProductsInReception { .. } => StatusCode::BAD_REQUEST,
        AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::ReceptionAlreadyOpen { .. } => "RECEPTION_ALREADY_OPEN",
        AppError::NoActiveReception { .. } => "NO_ACTIVE_RECEPTION",
        AppError::NoProductsInReception { .. } => "NO_PRODUCTS_IN_RECEPTION",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    let code = error_to_code(error);
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => ErrorResponse::not_found_error(entity, field, value),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => ErrorResponse::duplicate_error(entity, field, value),
        AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
        AppError::ValidationErrors { errors } => {
            ErrorResponse::new(code, "Request validation failed").with_details(json!(errors))
        }
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message } => ErrorResponse::new(code, message),
        AppError::ReceptionAlreadyOpen { pvz_id } | AppError::NoActiveReception { pvz_id } => {
            ErrorResponse::new(code, &error.to_string()).with_details(json!({ "pvzId": pvz_id }))
        }
        AppError::NoProductsInReception { reception_id } => {
            ErrorResponse::new(code, &error.to_string())
                .with_details(json!({ "receptionId": reception_id }))
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new(code, "Database connection unavailable")
        }
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            ErrorResponse::new(code, "An internal error occurred")
        }
    }
}

/// Builds the HTTP response for `error`, attaching `request_id` when known.
///
/// Server-side failures are logged with their full source chain; the body
/// only ever carries the generic message.
pub fn error_to_response_with_request_id(error: AppError, request_id: Option<String>) -> Response {
    let status = error_to_status_code(&error);
    if status.is_server_error() {
        tracing::error!(error = ?error, "Request failed");
    }

    let mut body = error_body(&error);
    if let Some(id) = request_id {
        body = body.with_request_id(&id);
    }

    (status, Json(body)).into_response()
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request - invalid or malformed request",
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        StatusCode::REQUEST_TIMEOUT => "Request timeout",
        StatusCode::PAYLOAD_TOO_LARGE => "Request payload too large",
        StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
        s if s.is_server_error() => "An internal server error occurred",
        _ => "An unknown error occurred",
    }
}

fn status_code_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.to_uppercase().replace([' ', '-'], "_"))
        .unwrap_or_else(|| "UNKNOWN_ERROR".to_string())
}

/// Global error handling middleware.
///
/// Error responses that are not already JSON are rewritten into an
/// [`ErrorResponse`]. Plain-text client error bodies (for example axum's path
/// rejections) become the message; server error bodies are never echoed.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original_message = match axum::body::to_bytes(body, MAX_PLAIN_ERROR_BODY).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };

    let message = if original_message.is_empty() || status.is_server_error() {
        default_message(status).to_string()
    } else {
        original_message
    };

    let mut error_response = ErrorResponse::new(&status_code_name(status), &message);
    if let Some(id) = request_id {
        error_response = error_response.with_request_id(&id);
    }

    let mut normalized = (status, Json(error_response)).into_response();
    for (name, value) in parts.headers.iter() {
        if *name != header::CONTENT_TYPE && *name != header::CONTENT_LENGTH {
            normalized.headers_mut().append(name.clone(), value.clone());
        }
    }
    normalized
}
