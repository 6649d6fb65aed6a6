//! Catalog browser.
//!
//! Read-only access to categories and products. Listings and single products
//! are cached with `moka` for the configured TTL; a TTL of zero turns the
//! cache off. Writes to the catalog happen out of band (see the `seed` CLI
//! command), so cached entries are only ever evicted by age.

mod cache;

use std::sync::Arc;

use libreria_core::{Category, Product, ProductId, SchemaError, collections};
use moka::future::Cache;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use cache::{CacheKey, CacheValue};

use crate::config::CatalogConfig;
use crate::store::{SharedStore, StoreError, StoredDocument};

/// Document field products are filtered on.
const CATEGORY_FIELD: &str = "category";

/// Catalog read errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document store failed the read.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A catalog document is malformed.
    #[error("corrupt catalog document: {0}")]
    Schema(#[from] SchemaError),

    /// No product with the requested id.
    #[error("product not found: {0}")]
    NotFound(ProductId),
}

/// Catalog browser backed by the document store.
pub struct CatalogBrowser {
    store: SharedStore,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl CatalogBrowser {
    #[must_use]
    pub fn new(store: SharedStore, config: &CatalogConfig) -> Self {
        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(config.cache_ttl)
                .build()
        });
        Self { store, cache }
    }

    /// List every category, ordered by document id.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the read fails and `Schema` when any
    /// category document is malformed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let docs = self.store.list(collections::CATEGORIES).await?;
        let categories = Arc::new(
            docs.iter()
                .map(|doc| Category::from_document(&doc.id, &doc.body))
                .collect::<Result<Vec<_>, _>>()?,
        );

        self.remember(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// List the products filed under `category`, matched by exact name.
    /// An unknown category yields an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_categories`].
    #[instrument(skip(self))]
    pub async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Arc<Vec<Product>>, CatalogError> {
        let key = CacheKey::CategoryProducts(category.to_owned());
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let docs = self
            .store
            .find_by_field(
                collections::PRODUCTS,
                CATEGORY_FIELD,
                &Value::String(category.to_owned()),
            )
            .await?;
        let products = Arc::new(parse_products(&docs)?);

        self.remember(key, CacheValue::Products(products.clone())).await;
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no product has this id, plus the errors of
    /// [`Self::list_categories`].
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let doc = self
            .store
            .get(collections::PRODUCTS, id.as_str())
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let product = Product::from_document(&doc.id, &doc.body)?;

        self.remember(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.cache {
            cache.insert(key, value).await;
        }
    }
}

fn parse_products(docs: &[StoredDocument]) -> Result<Vec<Product>, SchemaError> {
    docs.iter()
        .map(|doc| Product::from_document(&doc.id, &doc.body))
        .collect()
}
