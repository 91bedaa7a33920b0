//! bcrypt password hashing
//!
//! Both operations are CPU bound and run on the blocking pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),

    #[error("Password hashing task failed: {0}")]
    TaskFailed(String),
}

/// Hash a password with the given bcrypt cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
        .map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// Compare a password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?;

    match matched {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass", 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret-pass", &hash).await.unwrap());
        assert!(!verify_password("wrong-pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hash_password("same-password", 4).await.unwrap();
        let second = hash_password("same-password", 4).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cost_is_error() {
        assert!(hash_password("password", 2).await.is_err());
    }
}
