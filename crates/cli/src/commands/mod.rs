//! CLI subcommands.

pub mod cart;
pub mod migrate;
pub mod seed;

use std::sync::Arc;

use libreria_storefront::db::{self, PgDocumentStore};
use libreria_storefront::store::SharedStore;
use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by commands that talk to the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storefront database URL, with fallback to generic `DATABASE_URL`.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Connect to the storefront database.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Open the `PostgreSQL` document store.
async fn open_store() -> Result<SharedStore, CommandError> {
    Ok(Arc::new(PgDocumentStore::new(connect().await?)))
}
