//! Validation layer between schemaless store documents and typed records.
//!
//! The document store hands back arbitrary JSON objects. Nothing in the rest
//! of the system sees those objects directly: every record passes through the
//! `from_document` parsers here, which fail with a [`SchemaError`] naming the
//! offending collection, document and field.
//!
//! Field names follow the stored layout (`imageUrl`, `productId`, ...), which
//! is independent of how the typed records serialize over HTTP.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value, json};

use crate::types::{
    CartDocument, CartLine, Category, LineId, Price, Product, ProductId, Quantity,
};

/// A raw document body as held by the store.
pub type Document = Map<String, Value>;

/// Collection names used by the storefront.
pub mod collections {
    /// Product records, keyed by product id.
    pub const PRODUCTS: &str = "Products";
    /// Category records.
    pub const CATEGORIES: &str = "Categorias";
    /// One cart document per user, keyed by user id.
    pub const CARTS: &str = "cart";
}

/// A document did not have the shape its collection requires.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{collection}/{id}: missing field `{field}`")]
    MissingField {
        collection: &'static str,
        id: String,
        field: String,
    },

    #[error("{collection}/{id}: invalid field `{field}`: {reason}")]
    InvalidField {
        collection: &'static str,
        id: String,
        field: String,
        reason: String,
    },
}

/// Field accessors that attach document context to every failure.
struct Fields<'a> {
    collection: &'static str,
    id: &'a str,
    doc: &'a Document,
}

impl<'a> Fields<'a> {
    const fn new(collection: &'static str, id: &'a str, doc: &'a Document) -> Self {
        Self {
            collection,
            id,
            doc,
        }
    }

    fn missing(&self, field: &str) -> SchemaError {
        SchemaError::MissingField {
            collection: self.collection,
            id: self.id.to_owned(),
            field: field.to_owned(),
        }
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidField {
            collection: self.collection,
            id: self.id.to_owned(),
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    fn required_str(&self, field: &str) -> Result<&'a str, SchemaError> {
        match self.doc.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(self.invalid(field, "expected a string")),
        }
    }

    fn optional_str(&self, field: &str) -> Result<String, SchemaError> {
        match self.doc.get(field) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(field, "expected a string")),
        }
    }

    fn price(&self, field: &str) -> Result<Price, SchemaError> {
        let amount = match self.doc.get(field) {
            None | Some(Value::Null) => return Err(self.missing(field)),
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .map_err(|e| self.invalid(field, e.to_string()))?,
            Some(Value::String(s)) => {
                Decimal::from_str(s.trim()).map_err(|e| self.invalid(field, e.to_string()))?
            }
            Some(_) => return Err(self.invalid(field, "expected a number")),
        };
        Price::new(amount).map_err(|e| self.invalid(field, e.to_string()))
    }
}

impl Product {
    /// Parse a product document. The id comes from the document key.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if `name`, `price` or `category` is missing, or
    /// if any field has the wrong type or `price` is negative.
    pub fn from_document(id: &str, doc: &Document) -> Result<Self, SchemaError> {
        let fields = Fields::new(collections::PRODUCTS, id, doc);
        let product_id =
            ProductId::parse(id).map_err(|e| fields.invalid("id", e.to_string()))?;

        Ok(Self {
            id: product_id,
            name: fields.required_str("name")?.to_owned(),
            description: fields.optional_str("description")?,
            price: fields.price("price")?,
            image_url: fields.optional_str("imageUrl")?,
            about: fields.optional_str("about")?,
            category: fields.required_str("category")?.to_owned(),
        })
    }

    /// Render the stored form of this product (without its id).
    #[must_use]
    pub fn to_document(&self) -> Document {
        let price = serde_json::Number::from_str(&self.price.to_string())
            .map_or_else(|_| Value::String(self.price.to_string()), Value::Number);

        let mut doc = Document::new();
        doc.insert("name".into(), Value::String(self.name.clone()));
        doc.insert("description".into(), Value::String(self.description.clone()));
        doc.insert("price".into(), price);
        doc.insert("imageUrl".into(), Value::String(self.image_url.clone()));
        doc.insert("about".into(), Value::String(self.about.clone()));
        doc.insert("category".into(), Value::String(self.category.clone()));
        doc
    }
}

impl Category {
    /// Parse a category document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if `name` is missing or not a string.
    pub fn from_document(id: &str, doc: &Document) -> Result<Self, SchemaError> {
        let fields = Fields::new(collections::CATEGORIES, id, doc);
        Ok(Self::new(fields.required_str("name")?))
    }

    /// Render the stored form of this category.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), Value::String(self.name.clone()));
        doc
    }
}

impl CartDocument {
    /// Parse a user's cart document.
    ///
    /// A missing `items` field is an empty cart. Lines stored without a
    /// `lineId` receive [`LineId::legacy`] ids derived from their position.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if `items` is not an array, or if any line lacks
    /// a non-empty `productId` or a positive integer `quantity`.
    pub fn from_document(user_id: &str, doc: &Document) -> Result<Self, SchemaError> {
        let fields = Fields::new(collections::CARTS, user_id, doc);
        let items = match doc.get("items") {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(fields.invalid("items", "expected an array")),
        };

        let lines = items
            .iter()
            .enumerate()
            .map(|(position, item)| parse_line(&fields, position, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_lines(lines))
    }

    /// Render the stored form of this cart.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let items = self
            .items()
            .iter()
            .map(|line| {
                json!({
                    "lineId": line.id.to_string(),
                    "productId": line.product_id.as_str(),
                    "quantity": line.quantity.get(),
                })
            })
            .collect();

        let mut doc = Document::new();
        doc.insert("items".into(), Value::Array(items));
        doc
    }
}

fn parse_line(fields: &Fields<'_>, position: usize, item: &Value) -> Result<CartLine, SchemaError> {
    let field = |name: &str| format!("items[{position}].{name}");

    let Value::Object(line) = item else {
        return Err(fields.invalid(&format!("items[{position}]"), "expected an object"));
    };

    let product_id = match line.get("productId") {
        Some(Value::String(s)) => ProductId::parse(s.as_str())
            .map_err(|e| fields.invalid(&field("productId"), e.to_string()))?,
        None | Some(Value::Null) => return Err(fields.missing(&field("productId"))),
        Some(_) => return Err(fields.invalid(&field("productId"), "expected a string")),
    };

    let quantity = match line.get("quantity") {
        Some(Value::Number(n)) => {
            let raw = n
                .as_u64()
                .and_then(|q| u32::try_from(q).ok())
                .ok_or_else(|| fields.invalid(&field("quantity"), "expected a positive integer"))?;
            Quantity::new(raw).map_err(|e| fields.invalid(&field("quantity"), e.to_string()))?
        }
        None | Some(Value::Null) => return Err(fields.missing(&field("quantity"))),
        Some(_) => return Err(fields.invalid(&field("quantity"), "expected a number")),
    };

    let id = match line.get("lineId") {
        Some(Value::String(s)) => {
            LineId::parse(s).map_err(|e| fields.invalid(&field("lineId"), e.to_string()))?
        }
        None | Some(Value::Null) => LineId::legacy(position, &product_id),
        Some(_) => return Err(fields.invalid(&field("lineId"), "expected a string")),
    };

    Ok(CartLine {
        id,
        product_id,
        quantity,
    })
}
