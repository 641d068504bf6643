use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// PHC string for a new student password (Argon2id, default cost)
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Compares a login attempt with the stored PHC string
///
/// A malformed stored hash is a data problem, not a wrong password.
pub fn verify_password(attempt: &str, stored: &str) -> AppResult<bool> {
    let stored = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {e}")))?;

    match Argon2::default().verify_password(attempt.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!("Password check failed: {e}"))),
    }
}

/// Runs [`verify_password`] on the blocking pool so the hash cost never
/// stalls a runtime worker
pub async fn verify_password_blocking(attempt: String, stored: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&attempt, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {e}")))?
}
