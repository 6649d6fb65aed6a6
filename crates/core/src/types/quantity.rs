//! Cart line quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,
    /// Quantity exceeds the configured per-line maximum.
    #[error("quantity {value} exceeds the maximum of {max}")]
    AboveMax {
        /// Requested quantity.
        value: u32,
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// Number of units on a cart line. Always at least 1.
///
/// The type carries no upper bound: stored carts may hold any positive
/// quantity, and the per-line maximum is checked by [`Quantity::bounded`]
/// where new quantities enter the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Quantity of one unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::Zero` if `value` is 0.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError::Zero);
        }
        Ok(Self(value))
    }

    /// Create a quantity no larger than `max`.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::Zero` if `value` is 0 and
    /// `QuantityError::AboveMax` if it is larger than `max`.
    pub const fn bounded(value: u32, max: u32) -> Result<Self, QuantityError> {
        if value > max {
            return Err(QuantityError::AboveMax { value, max });
        }
        Self::new(value)
    }

    /// Get the number of units.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
