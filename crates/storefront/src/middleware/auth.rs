//! Acting-user extractor.
//!
//! The storefront sits behind an identity provider that forwards the signed-in
//! user's id in the `x-user-id` header. Cart operations take the id as an
//! `Option` and reject a missing user themselves.

use axum::{extract::FromRequestParts, http::request::Parts};
use libreria_core::UserId;

use crate::error::set_sentry_user;

/// The HTTP header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that optionally gets the acting user.
///
/// A missing, non-UTF-8 or blank header yields `None`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> impl IntoResponse {
///     match user {
///         Some(id) => format!("Hello, {id}!"),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<UserId>);

impl OptionalUser {
    #[must_use]
    pub const fn user(&self) -> Option<&UserId> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|raw| UserId::parse(raw.trim()).ok());

        if let Some(user) = &user {
            tracing::Span::current().record("user_id", user.as_str());
            set_sentry_user(user);
        }

        Ok(Self(user))
    }
}
