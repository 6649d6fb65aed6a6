//! Request ID middleware for request tracing and correlation.
//!
//! Reuses the id set by an upstream proxy when it looks sane, otherwise
//! generates a UUID v4. The id is recorded on the request span, tagged on the
//! Sentry scope and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream ids longer than this are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Accept an upstream id if it is short, non-empty printable ASCII.
fn accept_upstream(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let printable = raw.bytes().all(|b| b.is_ascii_graphic());
    (!raw.is_empty() && raw.len() <= MAX_REQUEST_ID_LEN && printable).then_some(raw)
}
