//! Cart and checkout route handlers.
//!
//! Every cart response is the resolved cart: stored lines joined against the
//! current catalog, with lines for vanished products left out. `position` in
//! a line view is its index in the stored document, which is what
//! `DELETE /cart/positions/{index}` expects.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use libreria_core::{LineId, ProductId, ResolvedCart, ResolvedCartLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::OptionalUser;
use crate::services::checkout::CheckoutSummary;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub line_id: LineId,
    pub position: usize,
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub total_amount: Decimal,
    pub item_count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format an amount with two decimals.
fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

impl From<&ResolvedCart> for CartView {
    fn from(cart: &ResolvedCart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            total: format_amount(cart.total),
            total_amount: cart.total,
            item_count: cart.item_count(),
        }
    }
}

impl From<&ResolvedCartLine> for CartItemView {
    fn from(line: &ResolvedCartLine) -> Self {
        Self {
            line_id: line.line_id,
            position: line.stored_index,
            product_id: line.product.id.to_string(),
            name: line.product.name.clone(),
            image_url: (!line.product.image_url.is_empty())
                .then(|| line.product.image_url.clone()),
            quantity: line.quantity.get(),
            price: line.product.price.display(),
            subtotal: format_amount(line.subtotal),
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Add to cart response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineResponse {
    pub line_id: LineId,
}

/// Quantity update request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the resolved cart.
#[instrument(skip(state, user))]
pub async fn show(State(state): State<AppState>, user: OptionalUser) -> Result<Json<CartView>> {
    let cart = state.cart().view(user.user()).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Append a line to the cart. Quantity defaults to one.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    user: OptionalUser,
    Json(body): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<AddLineResponse>)> {
    let product_id = body.product_id.to_string();
    let line_id = state
        .cart()
        .repository()
        .add_line(user.user(), body.product_id, body.quantity.unwrap_or(1))
        .await?;

    add_breadcrumb(
        "cart",
        "Added line",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok((StatusCode::CREATED, Json(AddLineResponse { line_id })))
}

/// Change the quantity of one line.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(line_id): Path<LineId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<StatusCode> {
    let found = state
        .cart()
        .repository()
        .update_quantity(user.user(), line_id, body.quantity)
        .await?;

    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("cart line {line_id}")))
    }
}

/// Remove one line by id.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(line_id): Path<LineId>,
) -> Result<StatusCode> {
    let found = state
        .cart()
        .repository()
        .remove_line(user.user(), line_id)
        .await?;

    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("cart line {line_id}")))
    }
}

/// Remove the line at a stored position. Out-of-range positions are a no-op.
#[instrument(skip(state, user))]
pub async fn remove_at(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(index): Path<usize>,
) -> Result<StatusCode> {
    state
        .cart()
        .repository()
        .remove_line_at(user.user(), index)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Redirect to the messaging deep link with the order prefilled.
#[instrument(skip(state, user))]
pub async fn checkout(State(state): State<AppState>, user: OptionalUser) -> Result<Response> {
    let summary = checkout_summary(&state, &user).await?;
    Ok(Redirect::to(&summary.url).into_response())
}

/// Order message, deep link and total without redirecting.
#[instrument(skip(state, user))]
pub async fn summary(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<Json<CheckoutSummary>> {
    Ok(Json(checkout_summary(&state, &user).await?))
}

async fn checkout_summary(state: &AppState, user: &OptionalUser) -> Result<CheckoutSummary> {
    let cart = state.cart().view(user.user()).await?;
    Ok(state.checkout().summary(&cart)?)
}
