//! In-memory stores and builders shared by unit and router tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::repos::document_repo::{Collection, Document, DocumentQuery, DocumentStore};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{NewPrincipal, Principal, UserStore};
use crate::services::auth::jwt::TokenService;
use crate::services::auth::password::PasswordService;
use crate::services::auth::secret::SigningSecret;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub const TEST_SECRET: &str = "router-test-secret";

/// `Config` from explicit pairs on top of the minimum required keys.
pub fn config(pairs: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://localhost/civic_test"),
        ("JWT_SECRET", TEST_SECRET),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in pairs {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn token_service() -> TokenService {
    token_service_with(TEST_SECRET)
}

pub fn token_service_with(secret: &str) -> TokenService {
    TokenService::new(&SigningSecret::new(secret).unwrap())
}

pub fn auth_service(users: Arc<dyn UserStore>) -> AuthService {
    AuthService::new(users, PasswordService::new().unwrap(), token_service())
}

pub fn memory_users() -> Arc<MemoryUserStore> {
    Arc::new(MemoryUserStore::default())
}

pub fn failing_users() -> Arc<FailingUserStore> {
    Arc::new(FailingUserStore)
}

pub fn test_state() -> AppState {
    let users: Arc<dyn UserStore> = memory_users();
    let auth = Arc::new(auth_service(users.clone()));
    AppState::new(users, Arc::new(MemoryDocumentStore::default()), auth)
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<HashMap<Uuid, Principal>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|p| p.email == email).cloned())
    }

    async fn create(&self, new: NewPrincipal) -> RepoResult<Principal> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|p| p.email == new.email) {
            return Err(RepoError::Conflict);
        }
        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Principal>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Principal>> {
        let mut all: Vec<Principal> = self.rows.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<Option<Principal>> {
        let mut rows = self.rows.write().await;
        if let Some(email) = email
            && rows.values().any(|p| p.id != id && p.email == email)
        {
            return Err(RepoError::Conflict);
        }
        let Some(principal) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            principal.name = name.to_string();
        }
        if let Some(email) = email {
            principal.email = email.to_string();
        }
        principal.updated_at = Utc::now();
        Ok(Some(principal.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// Every call times out.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_email(&self, _email: &str) -> RepoResult<Option<Principal>> {
        Err(RepoError::Timeout)
    }

    async fn create(&self, _new: NewPrincipal) -> RepoResult<Principal> {
        Err(RepoError::Timeout)
    }

    async fn get(&self, _id: Uuid) -> RepoResult<Option<Principal>> {
        Err(RepoError::Timeout)
    }

    async fn list(&self) -> RepoResult<Vec<Principal>> {
        Err(RepoError::Timeout)
    }

    async fn update(
        &self,
        _id: Uuid,
        _name: Option<&str>,
        _email: Option<&str>,
    ) -> RepoResult<Option<Principal>> {
        Err(RepoError::Timeout)
    }

    async fn delete(&self, _id: Uuid) -> RepoResult<bool> {
        Err(RepoError::Timeout)
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    rows: RwLock<HashMap<Collection, Vec<Document>>>,
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: Collection, body: Value) -> RepoResult<Document> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            body,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn find(&self, collection: Collection, query: DocumentQuery) -> RepoResult<Vec<Document>> {
        let rows = self.rows.read().await;
        // Newest insert first, so ties on the sort key match `created_at DESC`.
        let mut found: Vec<Document> = rows
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .rev()
                    .filter(|d| contains(&d.body, &query.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(key) = query.sort_desc_by {
            found.sort_by(|a, b| match (sort_text(&a.body, key), sort_text(&b.body, key)) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        if let Some(limit) = query.limit {
            found.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(found)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> RepoResult<Option<Document>> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: Value,
    ) -> RepoResult<Option<Document>> {
        let mut rows = self.rows.write().await;
        let Some(doc) = rows
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };
        doc.body = body;
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let Some(docs) = rows.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }
}

/// JSONB `@>` for the shapes the resource filters produce.
pub fn contains(doc: &Value, filter: &Value) -> bool {
    match (doc, filter) {
        (Value::Object(d), Value::Object(f)) => f
            .iter()
            .all(|(k, fv)| d.get(k).is_some_and(|dv| contains(dv, fv))),
        (Value::Array(d), Value::Array(f)) => {
            f.iter().all(|fv| d.iter().any(|dv| contains(dv, fv)))
        }
        (d, f) => d == f,
    }
}

// Postgres `->>`: strings unquoted, other values as JSON text.
fn sort_text(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn containment_follows_jsonb_rules() {
        let doc = json!({
            "title": "Budget",
            "jurisdiction": {"state": "CA", "city": "LA"},
            "voting_record": [{"representative_id": "r1", "vote": "yes"}]
        });

        assert!(contains(&doc, &json!({})));
        assert!(contains(&doc, &json!({"jurisdiction": {"state": "CA"}})));
        assert!(contains(&doc, &json!({"voting_record": [{"representative_id": "r1"}]})));
        assert!(!contains(&doc, &json!({"jurisdiction": {"state": "NY"}})));
        assert!(!contains(&doc, &json!({"voting_record": [{"representative_id": "r2"}]})));
        assert!(!contains(&doc, &json!({"missing": "x"})));
    }
}
