//! Newtype IDs for type-safe entity references.
//!
//! Store-assigned identifiers are opaque strings, so the `define_id!` macro
//! wraps a non-empty `String`. Cart lines are identified by [`LineId`], a UUID
//! minted by the cart itself.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing an identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or whitespace.
    #[error("identifier cannot be empty")]
    Empty,
    /// The input is not a valid UUID.
    #[error("invalid line id: {0}")]
    InvalidLineId(String),
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string, rejecting empty values
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `Display`, `FromStr`, `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use libreria_core::define_id;
/// define_id!(UserId);
/// define_id!(ProductId);
///
/// let user_id = UserId::parse("uid-1").unwrap();
/// let product_id = ProductId::parse("uid-1").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: UserId = product_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, rejecting empty or whitespace-only input.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if the input has no visible characters.
            pub fn parse(id: impl Into<String>) -> Result<Self, $crate::types::IdError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err($crate::types::IdError::Empty);
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::IdError;

            fn try_from(id: String) -> Result<Self, Self::Error> {
                Self::parse(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);

/// Namespace for line ids derived from documents that predate line ids.
const LEGACY_LINE_NAMESPACE: Uuid = Uuid::from_u128(0x6c69_6272_6572_6961_2d63_6172_742d_6c6e);

/// Stable identifier of one line inside a cart.
///
/// Deletion and quantity updates address lines by this id rather than by
/// position, so a line filtered out of a rendered cart never shifts the
/// target of a later mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// Mint a fresh random line id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive the id of a stored line that was written without one.
    ///
    /// The result only depends on the line's position and product, so repeated
    /// reads of an unchanged document agree on it.
    #[must_use]
    pub fn legacy(position: usize, product_id: &ProductId) -> Self {
        let name = format!("{position}:{product_id}");
        Self(Uuid::new_v5(&LEGACY_LINE_NAMESPACE, name.as_bytes()))
    }

    /// Parse a line id from its hyphenated UUID form.
    ///
    /// # Errors
    ///
    /// Returns `IdError::InvalidLineId` if the input is not a UUID.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdError::InvalidLineId(s.to_owned()))
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for LineId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
