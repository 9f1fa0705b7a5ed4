//! Explicit schema → collection mapping, supplied at startup

use std::collections::HashMap;

use crate::models::SchemaKind;

/// Collection name for every schema kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMap {
    names: HashMap<SchemaKind, String>,
}

impl Default for CollectionMap {
    fn default() -> Self {
        Self {
            names: SchemaKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_collection().to_owned()))
                .collect(),
        }
    }
}

impl CollectionMap {
    /// Defaults with the given overrides applied
    pub fn with_overrides(overrides: &HashMap<SchemaKind, String>) -> Self {
        let mut map = Self::default();
        for (kind, name) in overrides {
            map = map.with(*kind, name.clone());
        }
        map
    }

    pub fn with(mut self, kind: SchemaKind, name: impl Into<String>) -> Self {
        self.names.insert(kind, name.into());
        self
    }

    pub fn name(&self, kind: SchemaKind) -> &str {
        self.names
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_collection())
    }
}
