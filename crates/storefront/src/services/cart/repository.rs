//! Per-user cart document persistence.

use libreria_core::{CartDocument, CartLine, LineId, ProductId, Quantity, UserId, collections};
use tracing::{debug, instrument, warn};

use super::CartError;
use crate::config::CartConfig;
use crate::store::{Precondition, SharedStore};

/// How cart mutations are written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Conditional writes against the observed document version. A conflict
    /// re-reads the cart and replays the mutation, up to `max_attempts`.
    Versioned { max_attempts: u32 },
    /// Unconditional overwrite of the whole document. Two interleaved
    /// mutations of the same cart lose whichever one wrote first.
    LastWriteWins,
}

impl WriteMode {
    const fn attempts(self) -> u32 {
        match self {
            Self::Versioned { max_attempts } => {
                if max_attempts == 0 {
                    1
                } else {
                    max_attempts
                }
            }
            Self::LastWriteWins => 1,
        }
    }
}

impl Default for WriteMode {
    fn default() -> Self {
        Self::Versioned { max_attempts: 5 }
    }
}

/// Result of applying a mutation to a loaded cart.
enum Outcome<T> {
    /// The cart changed and must be written back.
    Changed(T),
    /// Nothing to persist.
    Unchanged(T),
}

/// Cart document repository.
///
/// Every operation loads the whole document, changes it in memory and writes
/// the whole document back. Callers without a user id get
/// [`CartError::Unauthenticated`] before the store is touched.
pub struct CartRepository {
    store: SharedStore,
    config: CartConfig,
}

impl CartRepository {
    #[must_use]
    pub const fn new(store: SharedStore, config: CartConfig) -> Self {
        Self { store, config }
    }

    /// Load the user's stored cart. A user with no document has an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a user, `StoreUnavailable` when the
    /// read fails and `Schema` when the stored document is malformed.
    #[instrument(skip(self))]
    pub async fn load(&self, user: Option<&UserId>) -> Result<CartDocument, CartError> {
        let user = require_user(user)?;
        let (_, cart) = self.read(user).await?;
        Ok(cart)
    }

    /// Append a line for `product_id`. Lines are never merged: adding a
    /// product that is already in the cart creates a second line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` when `quantity` is zero or above the
    /// configured per-line maximum, plus the errors of [`Self::load`] and
    /// `Contention` when versioned writes keep conflicting.
    #[instrument(skip(self))]
    pub async fn add_line(
        &self,
        user: Option<&UserId>,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineId, CartError> {
        let user = require_user(user)?;
        let quantity = Quantity::bounded(quantity, self.config.max_line_quantity)?;

        let line_id = self
            .mutate(user, |cart| {
                Outcome::Changed(cart.push(product_id.clone(), quantity))
            })
            .await?;

        debug!(%line_id, "cart line added");
        Ok(line_id)
    }

    /// Remove the line at `index` in stored order. An index past the end is
    /// a no-op and nothing is written.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_line`] minus `InvalidQuantity`.
    #[instrument(skip(self))]
    pub async fn remove_line_at(
        &self,
        user: Option<&UserId>,
        index: usize,
    ) -> Result<(), CartError> {
        let user = require_user(user)?;
        self.mutate(user, |cart| match cart.remove_at(index) {
            Some(_) => Outcome::Changed(()),
            None => Outcome::Unchanged(()),
        })
        .await
    }

    /// Remove the line with `line_id`. Returns `false` if no such line exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::remove_line_at`].
    #[instrument(skip(self))]
    pub async fn remove_line(
        &self,
        user: Option<&UserId>,
        line_id: LineId,
    ) -> Result<bool, CartError> {
        let user = require_user(user)?;
        self.mutate(user, |cart| {
            if cart.remove_line(line_id).is_some() {
                Outcome::Changed(true)
            } else {
                Outcome::Unchanged(false)
            }
        })
        .await
    }

    /// Set the quantity of the line with `line_id`. Returns `false` if no
    /// such line exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_line`].
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user: Option<&UserId>,
        line_id: LineId,
        quantity: u32,
    ) -> Result<bool, CartError> {
        let user = require_user(user)?;
        let quantity = Quantity::bounded(quantity, self.config.max_line_quantity)?;

        self.mutate(user, |cart| {
            if cart.set_quantity(line_id, quantity) {
                Outcome::Changed(true)
            } else {
                Outcome::Unchanged(false)
            }
        })
        .await
    }

    /// Overwrite the user's line list. The document is always written, even
    /// when `lines` equals what is stored.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_line`]; every line's quantity is checked against
    /// the per-line maximum.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn replace_lines(
        &self,
        user: Option<&UserId>,
        lines: Vec<CartLine>,
    ) -> Result<(), CartError> {
        let user = require_user(user)?;
        for line in &lines {
            Quantity::bounded(line.quantity.get(), self.config.max_line_quantity)?;
        }

        self.mutate(user, |cart| {
            cart.replace(lines.clone());
            Outcome::Changed(())
        })
        .await
    }

    async fn read(&self, user: &UserId) -> Result<(Precondition, CartDocument), CartError> {
        let stored = self.store.get(collections::CARTS, user.as_str()).await?;
        let observed = Precondition::observed(stored.as_ref());
        let cart = match stored {
            Some(doc) => CartDocument::from_document(user.as_str(), &doc.body)?,
            None => CartDocument::new(),
        };
        Ok((observed, cart))
    }

    /// Read-modify-write loop shared by every mutation.
    async fn mutate<T, F>(&self, user: &UserId, mut apply: F) -> Result<T, CartError>
    where
        F: FnMut(&mut CartDocument) -> Outcome<T> + Send,
        T: Send,
    {
        let attempts = self.config.write_mode.attempts();

        for attempt in 1..=attempts {
            let (observed, mut cart) = self.read(user).await?;

            let value = match apply(&mut cart) {
                Outcome::Changed(value) => value,
                Outcome::Unchanged(value) => return Ok(value),
            };

            let precondition = match self.config.write_mode {
                WriteMode::Versioned { .. } => observed,
                WriteMode::LastWriteWins => Precondition::Any,
            };

            match self
                .store
                .put(
                    collections::CARTS,
                    user.as_str(),
                    cart.to_document(),
                    precondition,
                )
                .await
            {
                Ok(version) => {
                    debug!(version, lines = cart.len(), "cart written");
                    return Ok(value);
                }
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "cart changed underneath us, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(user_id = %user, attempts, "giving up on contended cart");
        Err(CartError::Contention {
            user_id: user.to_string(),
            attempts,
        })
    }
}

fn require_user(user: Option<&UserId>) -> Result<&UserId, CartError> {
    user.ok_or(CartError::Unauthenticated)
}
