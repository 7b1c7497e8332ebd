//! User registration and credential checks.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserRole};
use crate::repositories::UserRepository;
use crate::utils::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

fn user_already_exists(email: &str) -> AppError {
    AppError::Duplicate {
        entity: "user".to_string(),
        field: "email".to_string(),
        value: email.to_string(),
    }
}

/// Runs a CPU-bound closure off the async executor.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Password task failed: {}", e),
        })?
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Registers a user with a freshly hashed password.
    ///
    /// # Errors
    /// - `Duplicate` if the email is already registered
    pub async fn register(&self, email: &str, password: &str, role: UserRole) -> AppResult<User> {
        if self.repo.find_by_email(email).await?.is_some() {
            tracing::warn!(email = %email, "Registration for existing email");
            return Err(user_already_exists(email));
        }

        let password = password.to_string();
        let password_hash = blocking(move || hash_password(&password)).await?;

        let user = self
            .repo
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                AppError::Duplicate { .. } => user_already_exists(email),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verifies credentials and returns the matching user.
    ///
    /// Unknown email and wrong password produce the same `Unauthorized` error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            tracing::warn!("Login with unknown email");
            return Err(AppError::invalid_credentials());
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = blocking(move || verify_password(&password, &stored_hash)).await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::invalid_credentials());
        }

        Ok(user)
    }
}
