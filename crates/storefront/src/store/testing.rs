//! Store wrappers for exercising concurrency and failure paths in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use libreria_core::Document;
use serde_json::Value;
use tokio::sync::Barrier;

use super::{DocumentStore, Precondition, SharedStore, StoreError, StoredDocument};

/// Holds the first `parties` reads of one collection until all of them have
/// happened, so that concurrent read-modify-write cycles are forced to read
/// before any of them writes.
pub struct PausingStore {
    inner: SharedStore,
    collection: String,
    gated_reads: AtomicUsize,
    barrier: Barrier,
}

impl PausingStore {
    #[must_use]
    pub fn new(inner: SharedStore, collection: &str, parties: usize) -> Self {
        Self {
            inner,
            collection: collection.to_owned(),
            gated_reads: AtomicUsize::new(parties),
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl DocumentStore for PausingStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let doc = self.inner.get(collection, id).await?;
        if collection == self.collection
            && self
                .gated_reads
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            self.barrier.wait().await;
        }
        Ok(doc)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        body: Document,
        precondition: Precondition,
    ) -> Result<u64, StoreError> {
        self.inner.put(collection, id, body, precondition).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.list(collection).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.find_by_field(collection, field, value).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Fails every operation on one collection (or on all of them) with
/// `StoreError::Unavailable`, delegating the rest.
pub struct UnavailableStore {
    inner: SharedStore,
    collection: Option<String>,
}

impl UnavailableStore {
    /// Fail every operation.
    #[must_use]
    pub fn everywhere(inner: SharedStore) -> Self {
        Self {
            inner,
            collection: None,
        }
    }

    /// Fail only operations on `collection`.
    #[must_use]
    pub fn for_collection(inner: SharedStore, collection: &str) -> Self {
        Self {
            inner,
            collection: Some(collection.to_owned()),
        }
    }

    fn check(&self, collection: &str) -> Result<(), StoreError> {
        match &self.collection {
            Some(failing) if failing != collection => Ok(()),
            _ => Err(StoreError::Unavailable(format!("{collection} is offline"))),
        }
    }
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.check(collection)?;
        self.inner.get(collection, id).await
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        body: Document,
        precondition: Precondition,
    ) -> Result<u64, StoreError> {
        self.check(collection)?;
        self.inner.put(collection, id, body, precondition).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check(collection)?;
        self.inner.delete(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.check(collection)?;
        self.inner.list(collection).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.check(collection)?;
        self.inner.find_by_field(collection, field, value).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.collection.is_none() {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        self.inner.ping().await
    }
}
