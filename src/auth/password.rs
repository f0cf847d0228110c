use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

/// Argon2 is CPU-bound, so both calls run on the blocking pool.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("secret1").await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash).await);
        assert!(!verify_password("secret2", &hash).await);
    }

    #[actix_web::test]
    async fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string").await);
    }
}
