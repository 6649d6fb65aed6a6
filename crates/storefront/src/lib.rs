//! Libreria storefront library.
//!
//! Cart synchronization and reconciliation over a document store, plus the
//! catalog, checkout and preference services and the HTTP surface around
//! them. This crate provides the storefront as a library, allowing it to be
//! tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
