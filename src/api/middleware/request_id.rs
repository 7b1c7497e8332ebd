//! Request ID middleware for request tracing.
//!
//! Every request carries an identifier, either the client's `x-request-id`
//! or a freshly generated UUID, which is echoed on the response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions for downstream access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

fn client_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

/// Middleware that ensures every request has a unique request ID.
///
/// Stores the ID as [`RequestId`] in request extensions and adds it to the
/// response headers.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = client_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}
