//! Cart engine.
//!
//! - [`CartRepository`] owns the per-user cart document and runs every
//!   mutation as a full read-modify-write cycle against the store.
//! - [`CartReconciler`] joins stored lines against the live catalog, drops
//!   lines whose product is gone and prices the rest.
//!
//! Every cart read that ends up in front of a user goes through the
//! reconciler; [`CartService::view`] bundles the two steps.

mod error;
mod reconciler;
mod repository;

pub use error::CartError;
pub use reconciler::CartReconciler;
pub use repository::{CartRepository, WriteMode};

use libreria_core::{ResolvedCart, UserId};
use tracing::instrument;

use crate::config::CartConfig;
use crate::store::SharedStore;

/// Repository and reconciler sharing one store.
pub struct CartService {
    repository: CartRepository,
    reconciler: CartReconciler,
}

impl CartService {
    #[must_use]
    pub fn new(store: SharedStore, config: CartConfig) -> Self {
        Self {
            repository: CartRepository::new(store.clone(), config),
            reconciler: CartReconciler::new(store),
        }
    }

    #[must_use]
    pub const fn repository(&self) -> &CartRepository {
        &self.repository
    }

    #[must_use]
    pub const fn reconciler(&self) -> &CartReconciler {
        &self.reconciler
    }

    /// Load a user's cart and resolve it against the current catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Unauthenticated` without a user, and store or
    /// schema errors from loading the cart document. Product lookups never
    /// fail the call.
    #[instrument(skip(self))]
    pub async fn view(&self, user: Option<&UserId>) -> Result<ResolvedCart, CartError> {
        let cart = self.repository.load(user).await?;
        Ok(self.reconciler.resolve(&cart).await)
    }
}
