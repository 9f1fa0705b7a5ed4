//! Typed access to records on top of a [`DocumentStore`]
//!
//! - list: fetch capped documents, strip the id, validate each one
//! - create: insert one already-validated record

use crate::models::{Schema, ValidationErrors};

use super::collections::CollectionMap;
use super::store::{create_document, DocumentStore, StoreError, ID_FIELD};

/// Failure while reading records
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document no longer satisfies its schema
    #[error("malformed {kind} document: {errors}")]
    Malformed {
        kind: &'static str,
        errors: ValidationErrors,
    },
}

/// Record repository
pub struct RecordRepo<'a> {
    store: &'a dyn DocumentStore,
    collections: &'a CollectionMap,
}

impl<'a> RecordRepo<'a> {
    pub fn new(store: &'a dyn DocumentStore, collections: &'a CollectionMap) -> Self {
        Self { store, collections }
    }

    /// Up to `limit` records of type `T`, in storage order.
    pub async fn list<T: Schema>(&self, limit: usize) -> Result<Vec<T>, ReadError> {
        let collection = self.collections.name(T::KIND);
        let docs = self.store.get_documents(collection, limit).await?;

        docs.into_iter()
            .map(|mut doc| {
                doc.remove(ID_FIELD);
                T::from_document(&doc).map_err(|errors| ReadError::Malformed {
                    kind: T::KIND.as_str(),
                    errors,
                })
            })
            .collect()
    }

    /// Insert a validated record, returning its identifier.
    pub async fn create<T: Schema>(&self, record: &T) -> Result<String, StoreError> {
        let collection = self.collections.name(T::KIND);
        let id = create_document(self.store, collection, record).await?;
        tracing::info!(collection = %collection, id = %id, "record created");
        Ok(id)
    }

    /// Collection names visible in the store.
    pub async fn collection_names(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        self.store.list_collections(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{GalleryImage, SchemaKind};
    use serde_json::json;

    #[tokio::test]
    async fn create_then_list_uses_mapped_collection() {
        let store = MemoryStore::new();
        let collections = CollectionMap::default().with(SchemaKind::GalleryImage, "photos");
        let repo = RecordRepo::new(&store, &collections);

        let image = GalleryImage {
            url: "https://example.org/a.jpg".into(),
            caption: None,
            order: 3,
        };
        repo.create(&image).await.unwrap();

        assert_eq!(store.count("photos"), 1);
        assert_eq!(repo.list::<GalleryImage>(8).await.unwrap(), vec![image]);
    }

    #[tokio::test]
    async fn malformed_document_is_reported() {
        let store = MemoryStore::new();
        store
            .insert_raw("galleryimage", json!({ "url": 42 }).as_object().cloned().unwrap())
            .unwrap();
        let collections = CollectionMap::default();

        let err = RecordRepo::new(&store, &collections)
            .list::<GalleryImage>(8)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::Malformed { kind: "gallery_image", .. }));
    }
}
