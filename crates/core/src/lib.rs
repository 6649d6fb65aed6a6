//! Libreria Core - Shared catalog and cart types.
//!
//! This crate provides the types used across all Libreria components:
//! - `storefront` - Cart engine, catalog browsing and HTTP API
//! - `cli` - Command-line tools for migrations, seeding and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, quantities, catalog and cart records
//! - [`schema`] - Parsing between schemaless store documents and typed records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod schema;
pub mod types;

pub use schema::{Document, SchemaError, collections};
pub use types::*;
