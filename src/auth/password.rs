use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;

use crate::errors::ServiceError;

/// Argon2id PHC string for `password`, computed on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, ServiceError> {
    let password = password.to_string();
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| ServiceError::HashError(format!("password hashing task failed: {e}")))?
}

/// Checks `password` against a stored PHC string. A malformed hash never verifies.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, ServiceError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || {
        let Ok(parsed_hash) = PasswordHash::new(&password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    })
    .await
    .map_err(|e| ServiceError::HashError(format!("password verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hash = hash_password("luminaria-led-30w").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("luminaria-led-30w", &hash).await.unwrap());
        assert!(!verify_password("luminaria-led-40w", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn salts_make_hashes_unique() {
        let a = hash_password("same-password").await.unwrap();
        let b = hash_password("same-password").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hashes_do_not_verify() {
        assert!(!verify_password("anything", "not-a-phc-string").await.unwrap());
    }
}
