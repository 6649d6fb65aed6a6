//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - Libros
//!   - Revistas
//! products:
//!   - id: rayuela
//!     name: Rayuela
//!     price: "12.50"
//!     category: Libros
//!     imageUrl: https://img.example/rayuela.jpg
//! ```
//!
//! Without `--replace`, documents that already exist are left alone.

use std::path::Path;

use libreria_core::{Category, Price, PriceError, Product, ProductId, collections};
use libreria_storefront::store::{DocumentStore, Precondition, StoreError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A product entry is not a valid product.
    #[error("invalid product `{id}`: {reason}")]
    InvalidProduct { id: String, reason: String },

    /// A category is named by a product but not declared.
    #[error("product `{product}` uses undeclared category `{category}`")]
    UnknownCategory { product: String, category: String },

    /// Writing to the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Catalog file layout.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product entry in the catalog file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub about: String,
    pub category: String,
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub written: usize,
    pub skipped: usize,
}

impl SeedProduct {
    fn to_product(&self) -> Result<Product, SeedError> {
        let invalid = |reason: String| SeedError::InvalidProduct {
            id: self.id.clone(),
            reason,
        };

        Ok(Product {
            id: ProductId::parse(self.id.as_str()).map_err(|e| invalid(e.to_string()))?,
            name: self.name.clone(),
            description: self.description.clone(),
            price: Price::new(self.price).map_err(|e: PriceError| invalid(e.to_string()))?,
            image_url: self.image_url.clone(),
            about: self.about.clone(),
            category: self.category.clone(),
        })
    }
}

/// Seed categories and products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `replace` - If true, overwrite documents that already exist
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or validated, or database operations fail.
pub async fn catalog(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: SeedCatalog = serde_yaml::from_str(&content)?;
    validate(&catalog)?;

    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Catalog validated successfully"
    );

    let store = super::open_store().await?;
    let result = seed(store.as_ref(), &catalog, replace).await?;

    info!("Seeding complete!");
    info!("  Documents written: {}", result.written);
    info!("  Documents skipped (already exist): {}", result.skipped);

    Ok(())
}

/// Check every product before anything is written.
fn validate(catalog: &SeedCatalog) -> Result<(), SeedError> {
    for product in &catalog.products {
        product.to_product()?;
        if !catalog.categories.contains(&product.category) {
            return Err(SeedError::UnknownCategory {
                product: product.id.clone(),
                category: product.category.clone(),
            });
        }
    }
    Ok(())
}

/// Write the catalog into `store`. Categories are keyed by name.
async fn seed(
    store: &dyn DocumentStore,
    catalog: &SeedCatalog,
    replace: bool,
) -> Result<SeedResult, SeedError> {
    let precondition = if replace {
        Precondition::Any
    } else {
        Precondition::Absent
    };
    let mut result = SeedResult::default();

    let categories = catalog
        .categories
        .iter()
        .map(|name| (collections::CATEGORIES, name.clone(), Category::new(name).to_document()));
    let products = catalog
        .products
        .iter()
        .map(|p| {
            p.to_product()
                .map(|product| (collections::PRODUCTS, p.id.clone(), product.to_document()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (collection, id, body) in categories.chain(products) {
        match store.put(collection, &id, body, precondition).await {
            Ok(_) => result.written += 1,
            Err(e) if e.is_conflict() => {
                warn!(collection, id = %id, "already exists, skipping");
                result.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use libreria_storefront::store::InMemoryStore;

    use super::*;

    const CATALOG: &str = r#"
categories:
  - Libros
  - Revistas
products:
  - id: rayuela
    name: Rayuela
    price: "12.50"
    category: Libros
    imageUrl: https://img.example/rayuela.jpg
  - id: gente
    name: Gente
    price: 3
    category: Revistas
"#;

    fn parse(yaml: &str) -> SeedCatalog {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_validate_accepts_catalog() {
        assert!(validate(&parse(CATALOG)).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let catalog = parse(
            "categories: [Libros]\nproducts:\n  - {id: x, name: X, price: \"-1\", category: Libros}\n",
        );
        assert!(matches!(
            validate(&catalog),
            Err(SeedError::InvalidProduct { id, .. }) if id == "x"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_category() {
        let catalog =
            parse("products:\n  - {id: x, name: X, price: 1, category: Comics}\n");
        assert!(matches!(
            validate(&catalog),
            Err(SeedError::UnknownCategory { .. })
        ));
    }

    #[tokio::test]
    async fn test_seed_writes_documents() {
        let store = InMemoryStore::new();
        let result = seed(&store, &parse(CATALOG), false).await.unwrap();
        assert_eq!(
            result,
            SeedResult {
                written: 4,
                skipped: 0
            }
        );

        let doc = store
            .get(collections::PRODUCTS, "rayuela")
            .await
            .unwrap()
            .unwrap();
        let product = Product::from_document(&doc.id, &doc.body).unwrap();
        assert_eq!(product.price.display(), "12.50");
        assert_eq!(product.category, "Libros");
    }

    #[tokio::test]
    async fn test_reseed_skips_unless_replacing() {
        let store = InMemoryStore::new();
        let catalog = parse(CATALOG);
        seed(&store, &catalog, false).await.unwrap();

        let again = seed(&store, &catalog, false).await.unwrap();
        assert_eq!(again.written, 0);
        assert_eq!(again.skipped, 4);

        let replaced = seed(&store, &catalog, true).await.unwrap();
        assert_eq!(replaced.written, 4);
    }
}
