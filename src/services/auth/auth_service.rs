use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::AppError;
use crate::repos::user_repo::{NewPrincipal, Principal, UserStore};
use crate::services::auth::jwt::TokenService;
use crate::services::auth::password::PasswordService;

/// Result of a successful login/registration.
///
/// Handlers map this into the HTTP DTO (AuthResponse).
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

/// Trim + lower-case, so uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Orchestrates credential checks and token issuance.
///
/// - UserStore is the credential store (lookup by email).
/// - PasswordService hashes/verifies; TokenService signs/verifies tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: PasswordService,
    tokens: TokenService,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, passwords: PasswordService, tokens: TokenService) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Unknown email and wrong password both end in `AppError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);

        let principal = match self.users.find_by_email(&email).await? {
            Some(p) => p,
            None => {
                // Same Argon2 cost as a real mismatch.
                self.passwords.verify_decoy(password).await;
                debug!("login rejected: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.passwords.verify(password, &principal.password_hash).await {
            debug!(user_id = %principal.id, "login rejected: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue(&principal)?;
        info!(user_id = %principal.id, "login succeeded");

        Ok(Session { token, principal })
    }

    /// Caller validates that fields are non-empty.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let email = normalize_email(email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use"));
        }

        let password_hash = self.passwords.hash(password).await.map_err(|e| {
            error!(error = %e, "failed to hash password");
            AppError::Dependency
        })?;

        // A concurrent registration can still win the race; the unique index reports Conflict.
        let principal = self
            .users
            .create(NewPrincipal {
                name: name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        let token = self.issue(&principal)?;
        info!(user_id = %principal.id, "principal registered");

        Ok(Session { token, principal })
    }

    fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        self.tokens.issue(principal).map_err(|_| AppError::Dependency)
    }
}
