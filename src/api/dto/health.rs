//! Health check DTOs for API responses.

use axum::http::StatusCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-01-01T12:00:00Z",
    "checks": {
        "storage": {
            "status": "healthy",
            "message": "Connected",
            "response_time_ms": 3
        }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
    /// Per-component results keyed by component name
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Probes answer 503 so orchestrators stop routing traffic here.
    pub fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[schema(example = "Connected")]
    pub message: Option<String>,
    /// Time taken by the check in milliseconds
    pub response_time_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_health_response_shape() {
        let mut checks = BTreeMap::new();
        checks.insert(
            "storage".to_string(),
            ComponentHealth {
                status: HealthStatus::Healthy,
                message: Some("Connected".to_string()),
                response_time_ms: Some(1),
            },
        );
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            timestamp: Timestamp::UNIX_EPOCH,
            checks,
        };

        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["checks"]["storage"]["message"], "Connected");
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00Z");
    }
}
