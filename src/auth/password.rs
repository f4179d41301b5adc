//! bcrypt hashing on the blocking pool

use crate::error::{Error, Result};

pub async fn hash(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| Error::Other(format!("password hashing task failed: {}", e)))?
        .map_err(Error::from)
}

/// A malformed stored hash never matches
pub async fn verify(password: String, hash: String) -> Result<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Other(format!("password verification task failed: {}", e)))?;
    match outcome {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            Ok(false)
        }
    }
}
