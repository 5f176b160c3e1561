//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Product data (price, stock,
//! variants) is looked up on the backend when a line is added; later updates
//! only use what the line captured then.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use franco_sport_core::{AddOutcome, Cart, CartKey, ProductId, VariantId};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stores::CartManager;

/// Body for `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Body for `PATCH /api/cart/items/{itemId}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Cart after an add, with the resulting line quantity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub cart: Cart,
    /// Line quantity after the add; `None` when nothing changed.
    pub quantity: Option<u32>,
}

fn parse_item_id(item_id: &str) -> Result<CartKey> {
    item_id
        .parse()
        .map_err(|e: franco_sport_core::CartKeyError| AppError::BadRequest(e.to_string()))
}

/// Current cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<Cart> {
    Json(CartManager::new(&session).load().await)
}

/// Add a product (or variant) to the cart.
///
/// Quantity defaults to 1 and is clamped to the stock the backend reports.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>> {
    let product = state.api().get_product(body.product_id).await?;
    let variant = match body.variant_id {
        Some(id) => Some(
            product
                .variant(id)
                .ok_or_else(|| AppError::NotFound(format!("Variant {id}")))?,
        ),
        None => None,
    };

    let (cart, outcome) = CartManager::new(&session)
        .add(&product, variant, body.quantity.unwrap_or(1))
        .await;

    let quantity = match outcome {
        AddOutcome::Inserted { quantity } | AddOutcome::Incremented { quantity } => Some(quantity),
        AddOutcome::Unchanged => None,
    };
    tracing::debug!(?outcome, items_count = cart.items_count(), "Cart add");

    Ok(Json(AddToCartResponse { cart, quantity }))
}

/// Set a line's quantity. Quantities below 1 are ignored.
#[instrument(skip(session, body))]
pub async fn update(
    session: Session,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>> {
    let key = parse_item_id(&item_id)?;
    let (cart, _) = CartManager::new(&session)
        .update_quantity(&key, body.quantity)
        .await;
    Ok(Json(cart))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(item_id): Path<String>) -> Result<Json<Cart>> {
    let key = parse_item_id(&item_id)?;
    let (cart, removed) = CartManager::new(&session).remove(&key).await;
    if removed.is_none() {
        return Err(AppError::NotFound(format!("Cart item {key}")));
    }
    Ok(Json(cart))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Json<Cart> {
    Json(CartManager::new(&session).clear().await)
}
