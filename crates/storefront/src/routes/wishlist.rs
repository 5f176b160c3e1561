//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use franco_sport_core::{ProductId, Wishlist};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stores::WishlistManager;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub in_wishlist: bool,
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw}")))
}

#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<Wishlist> {
    Json(WishlistManager::new(&session).load().await)
}

/// Add a product; adding one already present is a no-op.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToWishlistRequest>,
) -> Result<Json<Wishlist>> {
    let product = state.api().get_product(body.product_id).await?;
    let (wishlist, _) = WishlistManager::new(&session).add(&product).await;
    Ok(Json(wishlist))
}

#[instrument(skip(session))]
pub async fn contains(
    session: Session,
    Path(product_id): Path<String>,
) -> Result<Json<MembershipResponse>> {
    let product_id = parse_product_id(&product_id)?;
    let in_wishlist = WishlistManager::new(&session).contains(product_id).await;
    Ok(Json(MembershipResponse { in_wishlist }))
}

#[instrument(skip(session))]
pub async fn remove(session: Session, Path(product_id): Path<String>) -> Result<Json<Wishlist>> {
    let product_id = parse_product_id(&product_id)?;
    let (wishlist, _) = WishlistManager::new(&session).remove(product_id).await;
    Ok(Json(wishlist))
}

#[instrument(skip(session))]
pub async fn clear(session: Session) -> Json<Wishlist> {
    Json(WishlistManager::new(&session).clear().await)
}
