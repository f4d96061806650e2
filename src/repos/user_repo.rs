/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (Credential Store)
 * - email で principal を引き、保存済み password hash を返す
 * - "存在しない" (Ok(None)) と I/O 失敗 (Err) を区別して返す
 * - handler/service からは UserStore trait 越しに使う (テストでは差し替え)
 */
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::{STORE_TIMEOUT, bounded, error::RepoResult};

#[derive(Clone, FromRow)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // password_hash is deliberately absent
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Clone)]
pub struct NewPrincipal {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>>;

    // Unique-email violations surface as RepoError::Conflict.
    async fn create(&self, new: NewPrincipal) -> RepoResult<Principal>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Principal>>;

    async fn list(&self) -> RepoResult<Vec<Principal>>;

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<Option<Principal>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: STORE_TIMEOUT,
        }
    }
}

const COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Principal>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        bounded(
            self.timeout,
            sqlx::query_as::<_, Principal>(&sql)
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn create(&self, new: NewPrincipal) -> RepoResult<Principal> {
        let sql = format!(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, Principal>(&sql)
                .bind(Uuid::new_v4())
                .bind(&new.name)
                .bind(&new.email)
                .bind(&new.password_hash)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Principal>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        bounded(
            self.timeout,
            sqlx::query_as::<_, Principal>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn list(&self) -> RepoResult<Vec<Principal>> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        bounded(
            self.timeout,
            sqlx::query_as::<_, Principal>(&sql).fetch_all(&self.pool),
        )
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<Option<Principal>> {
        let sql = format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, Principal>(&sql)
                .bind(id)
                .bind(name)
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
