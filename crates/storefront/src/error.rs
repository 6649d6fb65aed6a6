//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::preferences::PreferenceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog read failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout link could not be built.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Preferences could not be saved.
    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferenceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::Unauthenticated => StatusCode::UNAUTHORIZED,
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::Contention { .. } => StatusCode::CONFLICT,
                CartError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CartError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CatalogError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Checkout(_) | Self::Preferences(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Cart(CartError::Unauthenticated) => "Sign in to use the cart".to_string(),
            Self::Cart(CartError::InvalidQuantity(err)) => err.to_string(),
            Self::Cart(CartError::Contention { .. }) => {
                "Cart was changed elsewhere, please retry".to_string()
            }
            Self::Catalog(CatalogError::NotFound(id)) => format!("Product not found: {id}"),
            Self::NotFound(_) => self.to_string(),
            _ if status == StatusCode::SERVICE_UNAVAILABLE => {
                "Service temporarily unavailable".to_string()
            }
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the acting user is known to associate errors with them.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added line", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use libreria_core::{ProductId, QuantityError};

    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::from(CartError::Unauthenticated);
        assert_eq!(err.to_string(), "Cart error: user is not authenticated");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: impl Into<AppError>) -> StatusCode {
            err.into().into_response().status()
        }

        assert_eq!(
            get_status(CartError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(CartError::InvalidQuantity(QuantityError::Zero)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::Contention {
                user_id: "u1".to_string(),
                attempts: 5
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CartError::StoreUnavailable(StoreError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(CatalogError::NotFound(ProductId::parse("p1").unwrap())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CheckoutError::MissingDestination),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::NotFound("cart line".to_string())),
            StatusCode::NOT_FOUND
        );
    }
}
