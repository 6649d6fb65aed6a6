//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Health check
//! GET    /health/ready               - Readiness (store ping)
//!
//! # Catalog
//! GET    /categories                 - Category listing
//! GET    /categories/{name}/products - Products in a category
//! GET    /products/{id}              - Product detail
//!
//! # Cart (acting user from `x-user-id`)
//! GET    /cart                       - Resolved cart
//! POST   /cart/lines                 - Add a line
//! PATCH  /cart/lines/{line_id}       - Update a line's quantity
//! DELETE /cart/lines/{line_id}       - Remove a line
//! DELETE /cart/positions/{index}     - Remove the line at a stored position
//!
//! # Checkout
//! GET    /checkout                   - Redirect to the messaging deep link
//! GET    /checkout/summary           - Order message, link and total
//!
//! # Preferences
//! GET    /preferences                - Display preferences
//! PUT    /preferences                - Update display preferences
//! ```

pub mod cart;
pub mod catalog;
pub mod health;
pub mod preferences;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/categories/{name}/products", get(catalog::category_products))
        .route("/products/{id}", get(catalog::product))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/lines", post(cart::add))
        .route("/lines/{line_id}", patch(cart::update).delete(cart::remove))
        .route("/positions/{index}", delete(cart::remove_at))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .route("/checkout/summary", get(cart::summary))
        .route(
            "/preferences",
            get(preferences::show).put(preferences::update),
        )
}

/// Build the application with request tracing attached.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{CartConfig, CatalogConfig, CheckoutConfig, StorefrontConfig};
    use crate::services::preferences::DisplayPreferences;
    use crate::store::testing::UnavailableStore;
    use crate::store::{InMemoryStore, SharedStore};

    async fn test_app(store: SharedStore) -> Router {
        let config = StorefrontConfig {
            database_url: None,
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            cart: CartConfig::default(),
            checkout: CheckoutConfig {
                base_url: Url::parse("https://wa.me").unwrap(),
                destination: "5491100000000".to_string(),
                greeting: None,
            },
            catalog: CatalogConfig::default(),
            preferences_path: std::env::temp_dir()
                .join(format!("libreria-routes-{}.json", uuid::Uuid::new_v4())),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let preferences = DisplayPreferences::load(&config.preferences_path).await;
        app(AppState::new(&config, store, preferences))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Arc::new(InMemoryStore::new())).await;
        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_reports_store_outage() {
        let store = Arc::new(UnavailableStore::everywhere(Arc::new(InMemoryStore::new())));
        let app = test_app(store).await;
        let (status, _) = send(app, get_request("/health/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = test_app(Arc::new(InMemoryStore::new())).await;
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "edge-123")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "edge-123");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let app = test_app(Arc::new(InMemoryStore::new())).await;
        let response = app.oneshot(get_request("/health")).await.unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_cart_requires_user() {
        let app = test_app(Arc::new(InMemoryStore::new())).await;
        let (status, _) = send(app, get_request("/cart")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_line_id_is_rejected() {
        let app = test_app(Arc::new(InMemoryStore::new())).await;
        let request = Request::builder()
            .method("DELETE")
            .uri("/cart/lines/not-a-uuid")
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
