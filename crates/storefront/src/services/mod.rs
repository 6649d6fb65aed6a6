//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart repository and reconciliation against the catalog
//! - `catalog` - Cached category and product reads
//! - `checkout` - Order summary and messaging deep link
//! - `preferences` - Persisted display preferences

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod preferences;
