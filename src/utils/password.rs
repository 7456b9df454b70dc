// Hashing runs on the blocking pool so actix workers keep serving requests
use bcrypt::{hash, verify};

use super::error::AppError;

pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch. A stored value that is not a bcrypt hash
/// counts as a mismatch.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    let result = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))?;

    match result {
        Ok(valid) => Ok(valid),
        Err(e) => {
            log::warn!("⚠️ Stored password is not a valid bcrypt hash: {}", e);
            Ok(false)
        }
    }
}
