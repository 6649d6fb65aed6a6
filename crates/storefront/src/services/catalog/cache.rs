//! Cache types for catalog reads.

use std::sync::Arc;

use libreria_core::{Category, Product, ProductId};

/// Cache key for catalog listings and products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    CategoryProducts(String),
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}
