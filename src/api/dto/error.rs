//! Error response DTOs.

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `RECEPTION_ALREADY_OPEN`
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new("NOT_FOUND", &format!("{} not found", capitalize(entity))).with_details(json!({
            "entity": entity,
            "field": field,
            "value": value,
        }))
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "DUPLICATE_ENTRY",
            &format!("{} with this {} already exists", capitalize(entity), field),
        )
        .with_details(json!({
            "entity": entity,
            "field": field,
            "value": value,
        }))
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", &format!("Invalid {}: {}", field, reason))
            .with_details(json!({ "field": field, "reason": reason }))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_skipped() {
        let value = serde_json::to_value(ErrorResponse::new("BAD_REQUEST", "nope")).unwrap();
        assert_eq!(value, json!({ "code": "BAD_REQUEST", "message": "nope" }));
    }

    #[test]
    fn test_request_id_is_camel_case() {
        let value = serde_json::to_value(
            ErrorResponse::new("NOT_FOUND", "missing").with_request_id("req-1"),
        )
        .unwrap();
        assert_eq!(value["requestId"], "req-1");
    }

    #[test]
    fn test_not_found_error_message() {
        let response = ErrorResponse::not_found_error("pickup point", "id", "42");
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.message, "Pickup point not found");
        assert_eq!(response.details.unwrap()["value"], "42");
    }

    #[test]
    fn test_duplicate_error_message() {
        let response = ErrorResponse::duplicate_error("user", "email", "a@b.com");
        assert_eq!(response.message, "User with this email already exists");
    }
}
