/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - users: credential store, documents: civic resources, auth: AuthService
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::repos::{document_repo::DocumentStore, user_repo::UserStore};
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        documents: Arc<dyn DocumentStore>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            users,
            documents,
            auth,
        }
    }
}
