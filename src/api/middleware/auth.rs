//! JWT authentication middleware.
//!
//! Validates the bearer token and stores the typed principal in request
//! extensions; handlers check the role before calling into the services.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::jwt::{Claims, DUMMY_SUBJECT, validate_token};

/// Authenticated principal, available to handlers as `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// `None` for tokens issued by the dummy login
    pub user_id: Option<Uuid>,
    pub role: UserRole,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> AppResult<Self> {
        let user_id = if claims.sub == DUMMY_SUBJECT {
            None
        } else {
            let id = claims.sub.parse().map_err(|_| AppError::Unauthorized {
                message: "Invalid subject in token".to_string(),
            })?;
            Some(id)
        };

        Ok(Self {
            user_id,
            role: claims.role,
        })
    }
}

impl AuthUser {
    /// Fails with `Forbidden` unless the principal holds one of `allowed`.
    pub fn require_role(&self, allowed: &[UserRole]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }

        tracing::warn!(role = %self.role, user_id = ?self.user_id, "Role not permitted");
        let allowed: Vec<&str> = allowed.iter().map(UserRole::as_str).collect();
        Err(AppError::Forbidden {
            message: format!("Requires role: {}", allowed.join(" or ")),
        })
    }
}

/// JWT authentication middleware
///
/// # Headers
/// Expects: `Authorization: Bearer <token>`
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing or malformed, or the
/// token fails validation.
///
/// # Example
/// ```ignore
/// OpenApiRouter::new()
///     .routes(routes!(handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing authorization header".to_string(),
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })?;

    let claims = validate_token(token, &state.jwt_config.secret)?;
    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: UserRole) -> Claims {
        Claims {
            sub: sub.to_string(),
            role,
            iat: 0,
            exp: 9_999_999_999,
        }
    }

    #[test]
    fn test_auth_user_from_user_claims() {
        let id = Uuid::new_v4();
        let user = AuthUser::try_from(claims(&id.to_string(), UserRole::Employee)).unwrap();
        assert_eq!(user.user_id, Some(id));
        assert_eq!(user.role, UserRole::Employee);
    }

    #[test]
    fn test_auth_user_from_dummy_claims() {
        let user = AuthUser::try_from(claims(DUMMY_SUBJECT, UserRole::Moderator)).unwrap();
        assert_eq!(user.user_id, None);
        assert_eq!(user.role, UserRole::Moderator);
    }

    #[test]
    fn test_auth_user_rejects_garbage_subject() {
        let result = AuthUser::try_from(claims("not-a-uuid", UserRole::Employee));
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_require_role() {
        let employee = AuthUser {
            user_id: None,
            role: UserRole::Employee,
        };
        assert!(employee.require_role(&[UserRole::Employee]).is_ok());
        assert!(
            employee
                .require_role(&[UserRole::Employee, UserRole::Moderator])
                .is_ok()
        );

        match employee.require_role(&[UserRole::Moderator]) {
            Err(AppError::Forbidden { message }) => assert_eq!(message, "Requires role: moderator"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }
}
