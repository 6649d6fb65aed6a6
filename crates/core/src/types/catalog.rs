//! Catalog records: products and the categories they are filed under.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as stored in the catalog.
///
/// `category` refers to [`Category::name`] by value; nothing guarantees the
/// category exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub about: String,
    pub category: String,
}

/// A product category. The name doubles as display label and filter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

impl Category {
    /// Create a category with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
