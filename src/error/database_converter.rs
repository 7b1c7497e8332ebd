use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

/// Partial unique index that allows at most one `in_progress` reception per pickup point.
pub const OPEN_RECEPTION_INDEX: &str = "receptions_one_open_per_pvz";

/// Converts Diesel errors into structured `AppError` variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error, tagging unclassified failures with `operation`.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let violation = ConstraintParser::parse(
            message,
            info.constraint_name(),
            info.table_name(),
            info.column_name(),
        );

        match (kind, violation) {
            (DatabaseErrorKind::UniqueViolation, _)
                if info.constraint_name() == Some(OPEN_RECEPTION_INDEX) =>
            {
                match ConstraintParser::extract_key_value_from_message(message)
                    .and_then(|(_, value)| Uuid::parse_str(&value).ok())
                {
                    Some(pvz_id) => AppError::ReceptionAlreadyOpen { pvz_id },
                    None => Self::unclassified(operation, "Open reception conflict", message),
                }
            }
            (DatabaseErrorKind::UniqueViolation, Some(v)) => AppError::Duplicate {
                entity: v.table,
                field: v.column,
                value: v.value.unwrap_or_else(|| "duplicate_value".to_string()),
            },
            (DatabaseErrorKind::NotNullViolation, Some(v)) => AppError::Validation {
                field: v.column,
                reason: format!("Field is required for {}", v.table),
            },
            (DatabaseErrorKind::ForeignKeyViolation, Some(v)) => AppError::Validation {
                field: v.column,
                reason: format!(
                    "Invalid reference from {} with value '{}'",
                    v.table,
                    v.value.as_deref().unwrap_or("unknown")
                ),
            },
            (DatabaseErrorKind::CheckViolation, Some(v)) => AppError::Validation {
                field: v.column,
                reason: format!("Check constraint failed for {}", v.table),
            },
            (DatabaseErrorKind::UniqueViolation, None) => {
                Self::unclassified(operation, "Unique constraint violation", message)
            }
            (DatabaseErrorKind::NotNullViolation, None) => {
                Self::unclassified(operation, "Not null constraint violation", message)
            }
            (DatabaseErrorKind::ForeignKeyViolation, None) => {
                Self::unclassified(operation, "Foreign key constraint violation", message)
            }
            (DatabaseErrorKind::CheckViolation, None) => {
                Self::unclassified(operation, "Check constraint violation", message)
            }
            _ => Self::unclassified(operation, "Database error", message),
        }
    }

    fn unclassified(operation: &str, label: &str, message: &str) -> AppError {
        AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{}: {}", label, message)),
        }
    }
}
