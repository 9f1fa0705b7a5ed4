//! Application state shared across handlers

use std::sync::Arc;

use crate::db::{CollectionMap, DocumentStore, RecordRepo};
use crate::http::error::ApiError;

/// Which connection settings were present in the environment at startup.
///
/// Only presence is recorded, never the values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigPresence {
    pub database_url: bool,
    pub database_name: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Option<Arc<dyn DocumentStore>>,
    collections: CollectionMap,
    presence: ConfigPresence,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn DocumentStore>>,
        collections: CollectionMap,
        presence: ConfigPresence,
    ) -> Self {
        Self {
            store,
            collections,
            presence,
        }
    }

    /// State with no store, as when the database is unconfigured
    pub fn unconfigured(presence: ConfigPresence) -> Self {
        Self::new(None, CollectionMap::default(), presence)
    }

    pub fn store(&self) -> Option<&dyn DocumentStore> {
        self.store.as_deref()
    }

    pub fn collections(&self) -> &CollectionMap {
        &self.collections
    }

    pub fn presence(&self) -> ConfigPresence {
        self.presence
    }

    /// Record access, or [`ApiError::NotConfigured`] when there is no store
    pub fn repo(&self) -> Result<RecordRepo<'_>, ApiError> {
        let store = self.store().ok_or(ApiError::NotConfigured)?;
        Ok(RecordRepo::new(store, &self.collections))
    }
}
