//! In-process document store
//!
//! Used by tests and by `serve --memory`. Documents live for the process
//! lifetime and keep insertion order per collection.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::store::{DocumentStore, StoreError, ID_FIELD};
use crate::models::Document;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Insert a raw document without any validation or stamping.
    ///
    /// Lets tests plant legacy or malformed data.
    pub fn insert_raw(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push((id.clone(), doc));
        Ok(id)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory store lock poisoned".into())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_documents(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .take(limit)
            .map(|(id, doc)| {
                let mut doc = doc.clone();
                doc.insert(ID_FIELD.into(), Value::String(id.clone()));
                doc
            })
            .collect())
    }

    async fn insert_document(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        self.insert_raw(collection, doc)
    }

    async fn list_collections(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names.truncate(limit);
        Ok(names)
    }
}
