//! Process-wide HMAC signing secret.
//!
//! Resolved once by `Config` and handed to `TokenService`. There is no fallback value:
//! a missing secret stops the process at startup instead of signing with a well-known key.

use std::fmt;

/// Shortest secret accepted in production (HS256 key size).
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, PartialEq, Eq)]
pub enum SecretError {
    Blank,
    TooShort { len: usize },
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretError::Blank => write!(f, "signing secret is blank"),
            SecretError::TooShort { len } => write!(
                f,
                "signing secret is {} bytes, at least {} required",
                len, MIN_PRODUCTION_SECRET_LEN
            ),
        }
    }
}

impl std::error::Error for SecretError {}

#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Accepts any non-blank value. Use [`SigningSecret::strict`] where short keys must be refused.
    pub fn new(raw: impl Into<String>) -> Result<Self, SecretError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SecretError::Blank);
        }
        Ok(Self(raw.into_bytes()))
    }

    pub fn strict(raw: impl Into<String>) -> Result<Self, SecretError> {
        let secret = Self::new(raw)?;
        if secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(SecretError::TooShort { len: secret.len() });
        }
        Ok(secret)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_weak(&self) -> bool {
        self.len() < MIN_PRODUCTION_SECRET_LEN
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
    }
}
