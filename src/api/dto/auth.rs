//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{User, UserRole};

/// Register request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// User's email address (unique)
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com", format = "email")]
    pub email: String,
    /// User's password (plain text, will be hashed)
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    #[schema(example = "password123", format = "password")]
    pub password: String,
    /// `employee` or `moderator`
    #[schema(example = "employee")]
    pub role: String,
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com", format = "email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    #[schema(example = "password123", format = "password")]
    pub password: String,
}

/// Dummy login payload: a token for the role, no account needed.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DummyLoginRequest {
    #[schema(example = "moderator")]
    pub role: String,
}

/// Bearer token issued by login and dummy login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
}

/// Registered user, without credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(format = "email")]
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}
