use argon2::{
    password_hash::{phc::PasswordHash, PasswordHasher, PasswordVerifier},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Hashes a password with Argon2id and a random salt, returning a PHC string.
///
/// CPU-bound; async callers should run it on a blocking thread.
pub fn hash_password(password: &str) -> AppResult<String> {
    Argon2::default()
        .hash_password(password.as_bytes())
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to hash password: {}", e),
        })
}

/// Checks `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; a malformed hash is an internal error.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Stored password hash is malformed: {}", e),
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
