//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHECKOUT_DESTINATION` - Messaging destination orders are sent to (phone number)
//!
//! ## Optional
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; without either the in-memory store is used)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CART_MAX_LINE_QUANTITY` - Per-line quantity cap (default: 10)
//! - `CART_WRITE_MODE` - `versioned` or `last-write-wins` (default: versioned)
//! - `CART_MAX_WRITE_ATTEMPTS` - Retries for versioned writes (default: 5)
//! - `CHECKOUT_BASE_URL` - Deep link base (default: <https://wa.me>)
//! - `CHECKOUT_GREETING` - Line placed above the order summary
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache TTL, 0 disables (default: 300)
//! - `CATALOG_CACHE_CAPACITY` - Max cached catalog entries (default: 1000)
//! - `PREFERENCES_PATH` - Display preferences file (default: preferences.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::services::cart::WriteMode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub cart: CartConfig,
    pub checkout: CheckoutConfig,
    pub catalog: CatalogConfig,
    /// Display preferences file
    pub preferences_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Cart repository settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartConfig {
    /// Largest quantity a single line may hold
    pub max_line_quantity: u32,
    pub write_mode: WriteMode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_line_quantity: 10,
            write_mode: WriteMode::default(),
        }
    }
}

/// Checkout deep link settings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Messaging URL the destination is appended to
    pub base_url: Url,
    /// Phone number (or other id) receiving orders
    pub destination: String,
    /// Line placed above the order summary
    pub greeting: Option<String>,
}

/// Catalog cache settings.
#[derive(Debug, Clone, Copy)]
pub struct CatalogConfig {
    /// Zero disables caching
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1_000,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let database_url = env
            .optional("STOREFRONT_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from);
        let host = env.parsed::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed::<u16>("STOREFRONT_PORT", "3000")?;

        Ok(Self {
            database_url,
            host,
            port,
            cart: CartConfig::from_env(&env)?,
            checkout: CheckoutConfig::from_env(&env)?,
            catalog: CatalogConfig::from_env(&env)?,
            preferences_path: PathBuf::from(env.or_default("PREFERENCES_PATH", "preferences.json")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CartConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let max_line_quantity = env.parsed::<u32>("CART_MAX_LINE_QUANTITY", "10")?;
        if max_line_quantity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_MAX_LINE_QUANTITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let max_attempts = env.parsed::<u32>("CART_MAX_WRITE_ATTEMPTS", "5")?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_MAX_WRITE_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let write_mode = match env.or_default("CART_WRITE_MODE", "versioned").as_str() {
            "versioned" => WriteMode::Versioned { max_attempts },
            "last-write-wins" => WriteMode::LastWriteWins,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CART_WRITE_MODE".to_string(),
                    format!("expected `versioned` or `last-write-wins`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            max_line_quantity,
            write_mode,
        })
    }
}

impl CheckoutConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let destination = env.required("CHECKOUT_DESTINATION")?;
        if destination.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_DESTINATION".to_string(),
                "must not be blank".to_string(),
            ));
        }

        Ok(Self {
            base_url: env.parsed::<Url>("CHECKOUT_BASE_URL", "https://wa.me")?,
            destination,
            greeting: env.optional("CHECKOUT_GREETING"),
        })
    }
}

impl CatalogConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            cache_ttl: Duration::from_secs(env.parsed::<u64>("CATALOG_CACHE_TTL_SECS", "300")?),
            cache_capacity: env.parsed::<u64>("CATALOG_CACHE_CAPACITY", "1000")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the lookups configuration loading needs.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
