//! Cart error types.

use thiserror::Error;

use libreria_core::{QuantityError, SchemaError};

use crate::store::StoreError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No user id was supplied.
    #[error("user is not authenticated")]
    Unauthenticated,

    /// Quantity is zero or above the per-line maximum.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The document store failed the operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The stored cart document is malformed.
    #[error("corrupt cart document: {0}")]
    Schema(#[from] SchemaError),

    /// Versioned writes kept conflicting with concurrent writers.
    #[error("cart for user {user_id} kept changing, gave up after {attempts} attempts")]
    Contention { user_id: String, attempts: u32 },
}

impl From<StoreError> for CartError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err)
    }
}
