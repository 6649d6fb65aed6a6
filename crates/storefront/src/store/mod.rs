//! Document store boundary.
//!
//! The storefront needs very little from its backing store:
//!
//! - keyed single-document get / put (carts, product lookups)
//! - "all documents in a collection" (categories)
//! - "documents in a collection where a field equals a value" (products by
//!   category)
//!
//! Every stored document carries a store-assigned `version` that increases
//! on each write. Writes take a [`Precondition`], which lets callers run
//! read-modify-write cycles without losing concurrent updates.
//!
//! # Adapters
//!
//! - [`InMemoryStore`] - process-local, used in tests and when no database is
//!   configured
//! - [`crate::db::PgDocumentStore`] - `PostgreSQL` JSONB table

mod memory;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use memory::InMemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use libreria_core::Document;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A conditional write found a different version than expected.
    #[error("write conflict on {collection}/{id}")]
    Conflict { collection: String, id: String },
}

impl StoreError {
    /// Whether the error is a failed write precondition rather than an I/O
    /// failure.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Overwrite unconditionally.
    Any,
    /// Only create; fail if the document already exists.
    Absent,
    /// Only replace the document if it is still at this version.
    Version(u64),
}

impl Precondition {
    /// Precondition matching what a read observed: the version of the
    /// document, or its absence.
    #[must_use]
    pub fn observed(doc: Option<&StoredDocument>) -> Self {
        doc.map_or(Self::Absent, |d| Self::Version(d.version))
    }
}

/// A document together with its key and current version.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub version: u64,
    pub body: Document,
}

/// Read/write access to a schemaless, key-addressed document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by key.
    async fn get(&self, collection: &str, id: &str)
    -> Result<Option<StoredDocument>, StoreError>;

    /// Replace the whole document at `id`, returning its new version.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        body: Document,
        precondition: Precondition,
    ) -> Result<u64, StoreError>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// All documents in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared handle to a document store.
pub type SharedStore = Arc<dyn DocumentStore>;
