//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use libreria_core::{Category, Product, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub about: String,
    pub category: String,
    /// Formatted with two decimals (e.g. "12.50")
    pub price: String,
    pub price_amount: Decimal,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            about: product.about.clone(),
            category: product.category.clone(),
            price: product.price.display(),
            price_amount: product.price.amount(),
            image_url: (!product.image_url.is_empty()).then(|| product.image_url.clone()),
        }
    }
}

/// Category display data.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
        }
    }
}

/// List all categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(Json(categories.iter().map(CategoryView::from).collect()))
}

/// List the products in one category.
#[instrument(skip(state))]
pub async fn category_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.catalog().list_products_by_category(&name).await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state.catalog().get_product(&id).await?;
    Ok(Json(ProductView::from(&product)))
}
