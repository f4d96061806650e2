use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

use crate::repos::user_repo::Principal;
use crate::services::auth::secret::SigningSecret;

/// Lifetime of every issued token (7 days).
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity claims carried by an access token. No scopes: every principal has the same rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Error)]
#[error("failed to sign token")]
pub struct IssueError(#[from] jsonwebtoken::errors::Error);

/// Why a token was refused. For logs only; callers must not echo this to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed token")]
    Malformed,
    #[error("unexpected signing algorithm")]
    AlgorithmMismatch,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::AlgorithmMismatch
            }
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// HS256 issuer and verifier sharing one secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl_seconds", &TOKEN_TTL_SECONDS)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked in `verify_at` against a caller-supplied clock, with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, IssueError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Sign claims for `principal` expiring `TOKEN_TTL_SECONDS` after `issued_at`.
    pub fn issue_at(&self, principal: &Principal, issued_at: i64) -> Result<String, IssueError> {
        let claims = Claims {
            user_id: principal.id.to_string(),
            email: principal.email.clone(),
            name: principal.name.clone(),
            exp: issued_at + TOKEN_TTL_SECONDS,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, IssueError> {
        let mut header = Header::new(ALGORITHM);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            IssueError(e)
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Algorithm and signature are checked by `jsonwebtoken::decode`; the token is
    /// accepted only while `now < exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, VerificationError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if now >= data.claims.exp {
            return Err(VerificationError::Expired);
        }

        Ok(data.claims)
    }
}
