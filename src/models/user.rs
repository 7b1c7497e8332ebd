use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Roles that gate access to the pickup point operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::UserRole")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Moderator => "moderator",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(UserRole::Employee),
            "moderator" => Ok(UserRole::Moderator),
            other => Err(AppError::Validation {
                field: "role".to_string(),
                reason: format!("unsupported role '{}'", other),
            }),
        }
    }
}

/// A registered user. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Data required to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}
