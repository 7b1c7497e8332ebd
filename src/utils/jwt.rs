use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::UserRole;

/// Subject used for tokens issued by the dummy login, which has no user record.
pub const DUMMY_SUBJECT: &str = "dummy";

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id, or [`DUMMY_SUBJECT`]
    pub sub: String,
    pub role: UserRole,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, role: UserRole, expiration_hours: i64) -> Self {
        let now = Timestamp::now();
        let exp = now.as_second() + SignedDuration::from_hours(expiration_hours).as_secs();

        Self {
            sub: subject.into(),
            role,
            iat: now.as_second(),
            exp,
        }
    }
}

/// Signs an HS256 token for `subject` with the given role.
///
/// # Example
/// ```ignore
/// let token = generate_token("dummy", UserRole::Employee, "secret", 12)?;
/// ```
pub fn generate_token(
    subject: impl Into<String>,
    role: UserRole,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(subject, role, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates signature and expiry and returns the claims.
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
    })
}
