//! Core types for Libreria.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart::{CartDocument, CartLine, ResolvedCart, ResolvedCartLine};
pub use catalog::{Category, Product};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
