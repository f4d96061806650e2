//! Argon2 password hashing and verification.
//!
//! Hashing cost is Argon2's fixed default and is not configurable. Both operations are CPU-bound,
//! so the async entry points move the work to the blocking pool.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    // The underlying error text never includes the plaintext, but keep it out of the message anyway.
    #[error("password hashing failed")]
    Hash,
    #[error("password worker failed")]
    Worker,
}

pub fn hash_blocking(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Malformed hashes and mismatches are both just `false`.
pub fn verify_blocking(plaintext: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct PasswordService {
    // Verified against when the email is unknown, so both login failures cost the same.
    decoy_hash: Arc<str>,
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService").finish_non_exhaustive()
    }
}

impl PasswordService {
    pub fn new() -> Result<Self, PasswordError> {
        let decoy = hash_blocking(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            decoy_hash: Arc::from(decoy),
        })
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&plaintext))
            .await
            .map_err(|_| PasswordError::Worker)?
    }

    pub async fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let plaintext = plaintext.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &stored))
            .await
            .unwrap_or(false)
    }

    /// Burn one verification against the decoy hash. Always `false` for any real input.
    pub async fn verify_decoy(&self, plaintext: &str) -> bool {
        let decoy = Arc::clone(&self.decoy_hash);
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &decoy))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_blocking("secret123").unwrap();
        assert!(verify_blocking("secret123", &hash));
        assert!(!verify_blocking("secret124", &hash));
        assert!(!verify_blocking("", &hash));
    }

    #[test]
    fn hashes_are_salted_and_never_contain_plaintext() {
        let a = hash_blocking("secret123").unwrap();
        let b = hash_blocking("secret123").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret123"));
        assert!(a.starts_with("$argon2"));
    }

    #[test]
    fn malformed_hash_is_a_plain_mismatch() {
        assert!(!verify_blocking("secret123", ""));
        assert!(!verify_blocking("secret123", "not-a-phc-string"));
        assert!(!verify_blocking("secret123", "$2a$10$bcryptlookingvalue"));
    }

    #[tokio::test]
    async fn async_api_runs_on_blocking_pool() {
        let passwords = PasswordService::new().unwrap();
        let hash = passwords.hash("correct horse").await.unwrap();
        assert!(passwords.verify("correct horse", &hash).await);
        assert!(!passwords.verify("battery staple", &hash).await);
        assert!(!passwords.verify_decoy("correct horse").await);
    }
}
