//! In-memory implementation of the `DocumentStore` port.
//!
//! Keeps every collection in a `BTreeMap`, so listings come back in key
//! order. Versions are drawn from one store-wide counter, which means a
//! document that is deleted and recreated never reuses an old version.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use libreria_core::Document;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, Precondition, StoreError, StoredDocument};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, (u64, Document)>>,
    last_version: u64,
}

/// Process-local document store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn stored(id: &str, entry: &(u64, Document)) -> StoredDocument {
    StoredDocument {
        id: id.to_owned(),
        version: entry.0,
        body: entry.1.clone(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| stored(id, entry)))
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        body: Document,
        precondition: Precondition,
    ) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        let current = guard
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|(version, _)| *version);

        let allowed = match precondition {
            Precondition::Any => true,
            Precondition::Absent => current.is_none(),
            Precondition::Version(expected) => current == Some(expected),
        };
        if !allowed {
            return Err(StoreError::Conflict {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }

        guard.last_version += 1;
        let version = guard.last_version;
        guard
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), (version, body));
        Ok(version)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut guard = self.inner.write().await;
        Ok(guard
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, entry)| stored(id, entry)).collect())
            .unwrap_or_default())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, (_, body))| body.get(field) == Some(value))
                    .map(|(id, entry)| stored(id, entry))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
