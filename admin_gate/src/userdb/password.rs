use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use ring::rand::SecureRandom;
use std::sync::LazyLock;

use crate::userdb::errors::UserError;

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let mut salt_bytes = [0u8; 16];
    ring::rand::SystemRandom::new()
        .fill(&mut salt_bytes)
        .map_err(|_| UserError::Hash("Failed to generate salt".to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| UserError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Hash(e.to_string()))
}

/// Check a password against a stored PHC string. A hash that does not parse never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-such-account").ok());

/// [`hash_password`] on the blocking pool, so Argon2 never stalls a runtime worker.
pub(crate) async fn hash_password_blocking(password: &str) -> Result<String, UserError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| UserError::Hash(format!("Hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool. A failed task counts as a mismatch.
pub(crate) async fn verify_password_blocking(password: &str, stored_hash: &str) -> bool {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await {
        Ok(matched) => matched,
        Err(e) => {
            tracing::error!(error = %e, "Password verification task failed");
            false
        }
    }
}

/// Spend the same work as a real verification when no account matched.
pub(crate) async fn dummy_verify(password: &str) {
    let password = password.to_string();
    let result = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&password, hash);
        }
    })
    .await;
    if let Err(e) = result {
        tracing::error!(error = %e, "Dummy verification task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unparseable_hash_never_verifies() {
        assert!(!verify_password("secret", "plaintext-secret"));
        assert!(!verify_password("", ""));
    }

    #[tokio::test]
    async fn test_dummy_verify_does_not_panic() {
        dummy_verify("anything").await;
    }

    #[tokio::test]
    async fn test_blocking_helpers_agree_with_sync_versions() {
        let hash = hash_password_blocking("pool side").await.unwrap();

        assert!(verify_password("pool side", &hash));
        assert!(verify_password_blocking("pool side", &hash).await);
        assert!(!verify_password_blocking("other", &hash).await);
        assert!(!verify_password_blocking("pool side", "not-a-phc-string").await);
    }
}
