use crate::utils::error::{FakerError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Hashes a plaintext password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FakerError::CredentialError {
            message: format!("failed to hash password: {}", e),
        })
}

/// `Ok(false)` for a wrong password; `Err` only if the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| FakerError::CredentialError {
        message: format!("stored password hash is malformed: {}", e),
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

async fn off_runtime<T, F>(operation: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| FakerError::CredentialError {
            message: format!("password task failed: {}", e),
        })?
}

/// [`hash_password`] on the blocking pool, keeping argon2 off the request workers.
pub async fn hash_password_blocking(password: &str) -> Result<String> {
    let password = password.to_string();
    off_runtime(move || hash_password(&password)).await
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    off_runtime(move || verify_password(&password, &stored_hash)).await
}
