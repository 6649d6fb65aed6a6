//! Integration tests for Libreria.
//!
//! Everything runs in-process against the in-memory document store, so no
//! database is needed:
//!
//! ```bash
//! cargo test -p libreria-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Repository, reconciler and composer working together
//! - `lost_update` - Concurrent writes to one cart under both write modes
//! - `http_api` - The storefront router driven through `tower::ServiceExt`
//!
//! This crate only holds shared fixtures.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use libreria_core::{Category, Price, Product, ProductId, UserId, collections};
use libreria_storefront::config::{CartConfig, CatalogConfig, CheckoutConfig, StorefrontConfig};
use libreria_storefront::services::cart::{CartService, WriteMode};
use libreria_storefront::services::preferences::DisplayPreferences;
use libreria_storefront::state::AppState;
use libreria_storefront::store::{DocumentStore, InMemoryStore, Precondition, SharedStore};
use rust_decimal::Decimal;
use url::Url;

/// Destination every test checkout is sent to.
pub const DESTINATION: &str = "5492944617762";

/// A catalog product with a whole-number price.
#[must_use]
pub fn product(id: &str, name: &str, price: i64, category: &str) -> Product {
    Product {
        id: ProductId::parse(id).unwrap(),
        name: name.to_string(),
        description: format!("{name} description"),
        price: Price::new(Decimal::new(price, 0)).unwrap(),
        image_url: format!("https://img.example/{id}.jpg"),
        about: String::new(),
        category: category.to_string(),
    }
}

#[must_use]
pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

#[must_use]
pub fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}

/// Store with categories `Libros` and `Revistas`, product `p1` (Rayuela, 10)
/// and product `p2` (Gente, 5).
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for name in ["Libros", "Revistas"] {
        store
            .put(
                collections::CATEGORIES,
                name,
                Category::new(name).to_document(),
                Precondition::Any,
            )
            .await
            .unwrap();
    }
    for p in [
        product("p1", "Rayuela", 10, "Libros"),
        product("p2", "Gente", 5, "Revistas"),
    ] {
        store
            .put(
                collections::PRODUCTS,
                p.id.as_str(),
                p.to_document(),
                Precondition::Any,
            )
            .await
            .unwrap();
    }
    store
}

/// Delete a product from the catalog.
pub async fn delete_product(store: &dyn DocumentStore, id: &str) {
    store.delete(collections::PRODUCTS, id).await.unwrap();
}

#[must_use]
pub fn cart_config(write_mode: WriteMode) -> CartConfig {
    CartConfig {
        max_line_quantity: 10,
        write_mode,
    }
}

#[must_use]
pub fn cart_service(store: SharedStore, write_mode: WriteMode) -> CartService {
    CartService::new(store, cart_config(write_mode))
}

fn temp_preferences() -> PathBuf {
    std::env::temp_dir().join(format!("libreria-it-{}.json", uuid::Uuid::new_v4()))
}

/// Configuration for an in-process server: no database, no catalog cache.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        cart: CartConfig::default(),
        checkout: CheckoutConfig {
            base_url: Url::parse("https://wa.me").unwrap(),
            destination: DESTINATION.to_string(),
            greeting: None,
        },
        catalog: CatalogConfig {
            cache_ttl: std::time::Duration::ZERO,
            ..CatalogConfig::default()
        },
        preferences_path: temp_preferences(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Application state over `store` with [`test_config`].
pub async fn test_state(store: SharedStore) -> AppState {
    let config = test_config();
    let preferences = DisplayPreferences::load(&config.preferences_path).await;
    AppState::new(&config, store, preferences)
}
