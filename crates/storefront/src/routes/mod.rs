//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Health check
//!
//! # Cart
//! GET    /api/cart                        - Cart with derived totals
//! POST   /api/cart/items                  - Add { productId, variantId?, quantity? }
//! PATCH  /api/cart/items/{itemId}         - Set { quantity }
//! DELETE /api/cart/items/{itemId}         - Remove line
//! DELETE /api/cart                        - Empty cart
//!
//! # Wishlist
//! GET    /api/wishlist                    - Wishlist
//! POST   /api/wishlist/items              - Add { productId }
//! GET    /api/wishlist/items/{productId}  - { inWishlist }
//! DELETE /api/wishlist/items/{productId}  - Remove
//! DELETE /api/wishlist                    - Empty wishlist
//!
//! # Auth
//! POST   /api/auth/session                - Sign in with { token }
//! GET    /api/auth/session                - Signed-in customer
//! DELETE /api/auth/session                - Sign out
//!
//! # Checkout (entry guard on every route)
//! GET    /api/checkout                    - Begin or resume
//! DELETE /api/checkout                    - Abandon
//! GET    /api/checkout/addresses          - Saved addresses
//! POST   /api/checkout/addresses          - Create address inline and select it
//! POST   /api/checkout/address            - Select { addressId }
//! POST   /api/checkout/payment            - Choose { method }
//! POST   /api/checkout/proof              - Attach proof image (multipart `proof`)
//! DELETE /api/checkout/proof              - Remove proof
//! POST   /api/checkout/redemption         - Redeem { points }
//! POST   /api/checkout/continue           - Next step
//! POST   /api/checkout/back               - Previous step
//! POST   /api/checkout/confirm            - Place order
//!
//! # Notifications
//! GET    /api/notifications               - Drain queued notices
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod notifications;
pub mod wishlist;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Multipart framing allowance on top of the proof size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add))
        .route(
            "/api/cart/items/{item_id}",
            patch(cart::update).delete(cart::remove),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(wishlist::show).delete(wishlist::clear))
        .route("/api/wishlist/items", post(wishlist::add))
        .route(
            "/api/wishlist/items/{product_id}",
            get(wishlist::contains).delete(wishlist::remove),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/api/auth/session",
        post(auth::sign_in).get(auth::current).delete(auth::sign_out),
    )
}

/// Create the checkout routes router.
///
/// `max_proof_bytes` sizes the body limit of the proof upload route.
pub fn checkout_routes(max_proof_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/checkout", get(checkout::show).delete(checkout::abandon))
        .route(
            "/api/checkout/addresses",
            get(checkout::addresses).post(checkout::create_address),
        )
        .route("/api/checkout/address", post(checkout::select_address))
        .route("/api/checkout/payment", post(checkout::select_payment))
        .route(
            "/api/checkout/proof",
            post(checkout::attach_proof)
                .delete(checkout::remove_proof)
                .layer(DefaultBodyLimit::max(max_proof_bytes + MULTIPART_OVERHEAD)),
        )
        .route("/api/checkout/redemption", post(checkout::set_redemption))
        .route("/api/checkout/continue", post(checkout::advance))
        .route("/api/checkout/back", post(checkout::back))
        .route("/api/checkout/confirm", post(checkout::confirm))
}

/// Create all API routes.
pub fn routes(max_proof_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(cart_routes())
        .merge(wishlist_routes())
        .merge(auth_routes())
        .merge(checkout_routes(max_proof_bytes))
        .route("/api/notifications", get(notifications::drain))
}
