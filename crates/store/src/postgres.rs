//! Postgres-backed document store.
//!
//! All collections share one `documents` table; bodies are stored as JSONB.
//!
//! ## Unique fields
//!
//! Each `(collection, field)` pair passed as a unique field gets a partial
//! unique expression index, created on first use. A violation surfaces as
//! SQLSTATE `23505` and is mapped to `StoreError::Duplicate`.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::{DocumentStore, RawDocument, StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    body JSONB NOT NULL,
    PRIMARY KEY (collection, key)
)
"#;

const CREATED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS documents_created_at_idx
    ON documents (collection, created_at DESC, key DESC)
"#;

#[derive(Debug)]
pub struct PostgresStore {
    pool: PgPool,
    indexed: Mutex<HashSet<(String, String)>>,
}

impl PostgresStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        for ddl in [SCHEMA, CREATED_INDEX] {
            sqlx::query(ddl)
                .execute(&pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(Self {
            pool,
            indexed: Mutex::new(HashSet::new()),
        })
    }

    async fn ensure_unique_indexes(&self, collection: &str, unique: &[&str]) -> StoreResult<()> {
        for field in unique {
            let id = (collection.to_string(), (*field).to_string());
            if self.indexed.lock().contains(&id) {
                continue;
            }
            if !is_identifier(collection) || !is_identifier(field) {
                return Err(StoreError::Backend(format!(
                    "cannot index {collection}.{field}"
                )));
            }
            let ddl = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS documents_{collection}_{field}_key \
                 ON documents ((body->>'{field}')) WHERE collection = '{collection}'"
            );
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_unique_index", e))?;
            self.indexed.lock().insert(id);
        }
        Ok(())
    }
}

/// Index names and predicates are built from these, so only plain identifiers pass.
fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl DocumentStore for PostgresStore {
    #[instrument(skip(self, doc, unique), fields(key = %doc.key), err)]
    async fn insert(&self, collection: &str, doc: RawDocument, unique: &[&str]) -> StoreResult<()> {
        self.ensure_unique_indexes(collection, unique).await?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, created_at, body)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(collection)
        .bind(&doc.key)
        .bind(doc.created_at)
        .bind(Json(&doc.body))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_error("insert", e, unique))?;
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;
        row.map(body).transpose()
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Option<Value>> {
        let row = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body -> $2 = $3
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_one", e))?;
        row.map(body).transpose()
    }

    #[instrument(skip(self, doc, unique), fields(key = %doc.key), err)]
    async fn replace(
        &self,
        collection: &str,
        doc: RawDocument,
        unique: &[&str],
    ) -> StoreResult<bool> {
        self.ensure_unique_indexes(collection, unique).await?;
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = $3
            WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(collection)
        .bind(&doc.key)
        .bind(Json(&doc.body))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_error("replace", e, unique))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query(
            "DELETE FROM documents WHERE collection = $1 AND key = $2 RETURNING body",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove", e))?;
        row.map(body).transpose()
    }

    async fn list(
        &self,
        collection: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1
            ORDER BY created_at DESC, key DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(collection)
        .bind(skip as i64)
        .bind(limit.map(|l| l as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;
        rows.into_iter().map(body).collect()
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        let n: i64 = row.try_get("n").map_err(|e| map_sqlx_error("count", e))?;
        Ok(n.max(0) as u64)
    }

    async fn clear(&self, collection: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear", e))?;
        Ok(result.rows_affected())
    }
}

fn body(row: sqlx::postgres::PgRow) -> StoreResult<Value> {
    let Json(value): Json<Value> = row
        .try_get("body")
        .map_err(|e| map_sqlx_error("decode_body", e))?;
    Ok(value)
}

fn map_unique_error(operation: &str, err: sqlx::Error, unique: &[&str]) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let field = db_err
                .constraint()
                .and_then(|c| unique.iter().find(|f| c.ends_with(&format!("_{f}_key"))))
                .map_or("id", |f| *f);
            return StoreError::Duplicate(field.to_string());
        }
    }
    map_sqlx_error(operation, err)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Connection(format!("{} in {}", err, operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
