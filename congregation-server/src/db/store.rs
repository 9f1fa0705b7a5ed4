//! Document store trait
//!
//! The store knows nothing about schemas: it hands out loosely-typed
//! documents and accepts already-validated ones. Callers validate on read.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::Document;

/// Key under which a document's identifier is returned
pub const ID_FIELD: &str = "_id";

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("document in collection '{collection}' is not an object")]
    NotAnObject { collection: String },

    #[error("{0}")]
    Backend(String),
}

/// A named-collection document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Up to `limit` documents from `collection`, in insertion order.
    /// Each carries its identifier under [`ID_FIELD`].
    async fn get_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError>;

    /// Insert one document, returning its new identifier.
    async fn insert_document(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    /// Names of collections holding at least one document.
    async fn list_collections(&self, limit: usize) -> Result<Vec<String>, StoreError>;
}

/// Serialize a validated record, stamp it, and insert it as one document.
pub async fn create_document<T>(
    store: &dyn DocumentStore,
    collection: &str,
    record: &T,
) -> Result<String, StoreError>
where
    T: Serialize + Sync,
{
    let mut doc = match serde_json::to_value(record)? {
        Value::Object(doc) => doc,
        _ => {
            return Err(StoreError::NotAnObject {
                collection: collection.to_owned(),
            })
        }
    };

    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    doc.insert("created_at".into(), now.clone());
    doc.insert("updated_at".into(), now);

    store.insert_document(collection, doc).await
}
