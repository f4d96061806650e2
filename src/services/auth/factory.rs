/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::repos::user_repo::UserStore;
use crate::services::auth::{AuthService, jwt::TokenService, password::PasswordService};

pub fn build_auth_service(
    config: &Config,
    users: Arc<dyn UserStore>,
) -> anyhow::Result<Arc<AuthService>> {
    let passwords = PasswordService::new()?;
    let tokens = TokenService::new(&config.jwt_secret);

    Ok(Arc::new(AuthService::new(users, passwords, tokens)))
}
