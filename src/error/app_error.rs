use crate::error::DatabaseErrorConverter;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single field failure reported by request validation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

/// Application-wide error type.
///
/// Domain rule violations of the reception workflow have their own variants so
/// the transport can map them to stable codes; everything else uses the
/// generic structured variants.
#[derive(Error, Debug)]
pub enum AppError {
    /// Entity lookup failed
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Unique constraint violation
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several fields rejected by request validation at once
    #[error("Validation failed for {} field(s)", errors.len())]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The pickup point already has a reception in progress
    #[error("Pickup point {pvz_id} already has an open reception")]
    ReceptionAlreadyOpen { pvz_id: Uuid },

    /// The pickup point has no reception, or its latest one is closed
    #[error("Pickup point {pvz_id} has no active reception")]
    NoActiveReception { pvz_id: Uuid },

    /// Last-product deletion on an empty open reception
    #[error("Reception {reception_id} has no products to delete")]
    NoProductsInReception { reception_id: Uuid },

    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a missing pickup point.
    pub fn pickup_point_not_found(id: Uuid) -> Self {
        AppError::NotFound {
            entity: "pickup point".to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized {
            message: "Invalid email or password".to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(error: crate::config::ConfigError) -> Self {
        let key = error.field().unwrap_or("config").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::msg(error.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_point_not_found_message() {
        let id = Uuid::nil();
        let error = AppError::pickup_point_not_found(id);
        assert_eq!(
            error.to_string(),
            format!("Resource not found: pickup point with id={}", id)
        );
    }

    #[test]
    fn test_domain_error_messages() {
        let id = Uuid::new_v4();
        assert!(AppError::ReceptionAlreadyOpen { pvz_id: id }
            .to_string()
            .contains("already has an open reception"));
        assert!(AppError::NoActiveReception { pvz_id: id }
            .to_string()
            .contains("no active reception"));
        assert!(AppError::NoProductsInReception { reception_id: id }
            .to_string()
            .contains("no products"));
    }

    #[test]
    fn test_anyhow_converts_to_internal() {
        let error: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(error, AppError::Internal { .. }));
    }

    #[test]
    fn test_validation_errors_counts_fields() {
        let error = AppError::ValidationErrors {
            errors: vec![
                ValidationFieldError {
                    field: "email".to_string(),
                    message: "invalid".to_string(),
                },
                ValidationFieldError {
                    field: "password".to_string(),
                    message: "empty".to_string(),
                },
            ],
        };
        assert_eq!(error.to_string(), "Validation failed for 2 field(s)");
    }

    #[test]
    fn test_config_validation_error_keeps_field() {
        let error: AppError =
            crate::config::ConfigError::validation("jwt.secret", "JWT secret cannot be empty")
                .into();
        match error {
            AppError::Configuration { key, .. } => assert_eq!(key, "jwt.secret"),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }
}
