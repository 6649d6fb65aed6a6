//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first, as built by `routes::app`)
//!
//! 1. `TraceLayer` (request span)
//! 2. Request ID (add unique ID to each request, recorded on the span)
//!
//! The binary wraps the whole router in the Sentry layers on top of these.
//!
//! The acting user is not middleware: handlers take it through the
//! [`OptionalUser`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{OptionalUser, USER_ID_HEADER};
pub use request_id::request_id_middleware;
