/*
 * Responsibility
 * - documents テーブル (JSONB) 向け SQLx 操作
 * - collection ごとに create / find (containment filter) / get / replace / delete を提供
 * - policies / representatives / quizzes の共通の保存先
 */
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use crate::repos::{STORE_TIMEOUT, bounded, error::RepoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Policies,
    Representatives,
    Quizzes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Policies => "policies",
            Collection::Representatives => "representatives",
            Collection::Quizzes => "quizzes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `filter` is matched with JSONB containment (`body @> filter`); `{}` matches everything.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    pub filter: Value,
    pub sort_desc_by: Option<&'static str>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: Collection, body: Value) -> RepoResult<Document>;

    async fn find(&self, collection: Collection, query: DocumentQuery) -> RepoResult<Vec<Document>>;

    async fn get(&self, collection: Collection, id: Uuid) -> RepoResult<Option<Document>>;

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: Value,
    ) -> RepoResult<Option<Document>>;

    async fn delete(&self, collection: Collection, id: Uuid) -> RepoResult<bool>;
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            body: row.body.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgDocumentStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: STORE_TIMEOUT,
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: Collection, body: Value) -> RepoResult<Document> {
        let row = bounded(
            self.timeout,
            sqlx::query_as::<_, DocumentRow>(
                r#"
                INSERT INTO documents (collection, id, body)
                VALUES ($1, $2, $3)
                RETURNING id, body, created_at, updated_at
                "#,
            )
            .bind(collection.as_str())
            .bind(Uuid::new_v4())
            .bind(Json(&body))
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into())
    }

    async fn find(&self, collection: Collection, query: DocumentQuery) -> RepoResult<Vec<Document>> {
        // LIMIT NULL means "no limit" in Postgres.
        let rows = bounded(
            self.timeout,
            sqlx::query_as::<_, DocumentRow>(
                r#"
                SELECT id, body, created_at, updated_at
                FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY body ->> ($3::text) DESC NULLS LAST, created_at DESC
                LIMIT $4
                "#,
            )
            .bind(collection.as_str())
            .bind(Json(&query.filter))
            .bind(query.sort_desc_by)
            .bind(query.limit)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> RepoResult<Option<Document>> {
        let row = bounded(
            self.timeout,
            sqlx::query_as::<_, DocumentRow>(
                r#"
                SELECT id, body, created_at, updated_at
                FROM documents
                WHERE collection = $1 AND id = $2
                "#,
            )
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Document::from))
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: Value,
    ) -> RepoResult<Option<Document>> {
        let row = bounded(
            self.timeout,
            sqlx::query_as::<_, DocumentRow>(
                r#"
                UPDATE documents
                SET body = $3, updated_at = now()
                WHERE collection = $1 AND id = $2
                RETURNING id, body, created_at, updated_at
                "#,
            )
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(&body))
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> RepoResult<bool> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection.as_str())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
