//! PostgreSQL document store
//!
//! All collections share one `documents` table; each row holds one JSONB
//! document. `seq` records insertion order.
//!
//! The table is created on first use. A failed bootstrap is retried by the
//! next operation, so a database that comes up after the server still works.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::store::{DocumentStore, StoreError, ID_FIELD};
use crate::models::Document;

/// Document store backed by a sqlx pool
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    /// Set once the table exists; shared by clones
    schema: Arc<OnceCell<()>>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Create the documents table and its index if missing.
    ///
    /// Succeeds without a round trip once the table is known to exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema
            .get_or_try_init(|| self.create_schema())
            .await
            .map(|_| ())
    }

    async fn create_schema(&self) -> Result<(), StoreError> {
        tracing::info!("Ensuring document table exists...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                collection TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection_seq ON documents(collection, seq)",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Document table ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        self.ensure_schema().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY seq
            LIMIT $2
            "#,
        )
        .bind(collection)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                let Json(body): Json<Value> = row.try_get("body")?;
                match body {
                    Value::Object(mut doc) => {
                        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
                        Ok(doc)
                    }
                    _ => Err(StoreError::NotAnObject {
                        collection: collection.to_owned(),
                    }),
                }
            })
            .collect()
    }

    async fn insert_document(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        self.ensure_schema().await?;
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;

        tracing::debug!(collection = %collection, id = %id, "document inserted");
        Ok(id.to_string())
    }

    async fn list_collections(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        self.ensure_schema().await?;

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT collection FROM documents ORDER BY collection LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
