//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogBrowser;
use crate::services::checkout::CheckoutComposer;
use crate::services::preferences::DisplayPreferences;
use crate::store::SharedStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the document store and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: SharedStore,
    cart: CartService,
    catalog: CatalogBrowser,
    checkout: CheckoutComposer,
    preferences: DisplayPreferences,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration the services are built from
    /// * `store` - Document store backing carts and the catalog
    /// * `preferences` - Loaded display preferences
    #[must_use]
    pub fn new(
        config: &StorefrontConfig,
        store: SharedStore,
        preferences: DisplayPreferences,
    ) -> Self {
        let cart = CartService::new(store.clone(), config.cart);
        let catalog = CatalogBrowser::new(store.clone(), &config.catalog);
        let checkout = CheckoutComposer::new(config.checkout.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                cart,
                catalog,
                checkout,
                preferences,
            }),
        }
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogBrowser {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutComposer {
        &self.inner.checkout
    }

    #[must_use]
    pub fn preferences(&self) -> &DisplayPreferences {
        &self.inner.preferences
    }
}
