//! Checkout composer.
//!
//! Turns a resolved cart into a plain-text order summary and a deep link
//! that opens the configured messaging destination with that summary
//! prefilled. Nothing here touches the store.

use libreria_core::{ResolvedCart, ResolvedCartLine};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::CheckoutConfig;

/// Checkout errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The message or destination could not be turned into a valid URL.
    #[error("cannot encode checkout link: {0}")]
    Encoding(String),

    /// No destination to send the order to.
    #[error("checkout destination is empty")]
    MissingDestination,
}

/// Order summary ready to hand to the external channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub message: String,
    pub url: String,
    pub total: Decimal,
}

/// Render one line per resolved cart line followed by the total.
///
/// Amounts are printed without trailing zeros (`35`, `12.5`).
#[must_use]
pub fn compose(lines: &[ResolvedCartLine], total: Decimal) -> String {
    let mut message: String = lines
        .iter()
        .map(|line| {
            format!(
                "{} - qty:{} - subtotal:{}",
                line.product.name,
                line.quantity,
                line.subtotal.normalize()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    if !message.is_empty() {
        message.push('\n');
    }
    message.push_str(&format!("total:{}", total.normalize()));
    message
}

/// Build the deep link `<base>/<destination>?text=<message>`.
///
/// The message is percent-encoded as a URI component.
///
/// # Errors
///
/// Returns `MissingDestination` for a blank destination and `Encoding` if
/// `base` cannot carry a path (e.g. a `mailto:` URL).
pub fn to_deep_link(message: &str, destination: &str, base: &Url) -> Result<Url, CheckoutError> {
    let destination = destination.trim();
    if destination.is_empty() {
        return Err(CheckoutError::MissingDestination);
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CheckoutError::Encoding(format!("{base} cannot take a path")))?
        .pop_if_empty()
        .push(destination);

    let query = format!("text={}", urlencoding::encode(message));
    url.set_query(Some(&query));
    Ok(url)
}

/// Composes checkout summaries for one configured destination.
pub struct CheckoutComposer {
    config: CheckoutConfig,
}

impl CheckoutComposer {
    #[must_use]
    pub const fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    /// The full message for `cart`, greeting first when one is configured.
    #[must_use]
    pub fn message(&self, cart: &ResolvedCart) -> String {
        let body = compose(&cart.lines, cart.total);
        match self.config.greeting.as_deref() {
            Some(greeting) if !greeting.trim().is_empty() => format!("{greeting}\n\n{body}"),
            _ => body,
        }
    }

    /// Message, deep link and total for `cart`.
    ///
    /// # Errors
    ///
    /// Same as [`to_deep_link`].
    pub fn summary(&self, cart: &ResolvedCart) -> Result<CheckoutSummary, CheckoutError> {
        let message = self.message(cart);
        let url = to_deep_link(&message, &self.config.destination, &self.config.base_url)?;
        Ok(CheckoutSummary {
            message,
            url: url.into(),
            total: cart.total,
        })
    }
}
