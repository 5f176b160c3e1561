//! Order submission.
//!
//! Ordering is strict: the proof image (if any) is uploaded first, and the
//! order is only posted once its URL is known. Nothing local changes until the
//! backend accepts the order.

use serde::Serialize;
use tracing::{info, warn};

use franco_sport_core::{Cart, Checkout, CheckoutRejection, OrderId, OrderRequest, ProofAttachment};

use crate::error::{Result, add_breadcrumb};
use crate::models::{CurrentCustomer, session_keys};
use crate::notifications::{self, Notice};
use crate::state::AppState;
use crate::stores::{CartManager, StateStore, forget};

/// Response for a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Where the client goes next.
    pub redirect: String,
}

/// Confirm `checkout` against `cart` and place the order.
///
/// On success the cart is emptied, the checkout and its proof are dropped and
/// a success notice is queued. On failure an error notice is queued and the
/// session is left untouched so the customer can retry from review.
pub(super) async fn submit<S: StateStore>(
    state: &AppState,
    store: &S,
    customer: &CurrentCustomer,
    checkout: &Checkout,
    cart: &Cart,
) -> Result<PlacedOrder> {
    let draft = checkout.confirm(cart.subtotal())?;

    let proof_url = match draft.payment.proof() {
        Some(proof) => Some(upload_proof(state, store, customer, proof).await?),
        None => None,
    };

    let request = OrderRequest::new(cart, &draft, proof_url);
    let created = match state
        .api()
        .create_order(&customer.access_token, &request)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            warn!(error = %e, "Order creation failed");
            notifications::push(
                store,
                Notice::error(format!(
                    "We couldn't place your order: {}",
                    e.user_message()
                )),
            )
            .await;
            return Err(e.into());
        }
    };

    CartManager::new(store).clear().await;
    forget(store, session_keys::CHECKOUT).await;
    if let Some(proof) = draft.payment.proof() {
        state.proofs().discard(proof.id).await;
    }
    // Stock moved; the next add must see fresh numbers
    for line in &request.items {
        state.api().invalidate_product(line.product_id).await;
    }

    let label = created
        .order_number
        .clone()
        .unwrap_or_else(|| format!("#{}", created.id));
    notifications::push(store, Notice::success(format!("Order {label} placed"))).await;

    let order_id = created.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
    info!(
        order_id = %created.id,
        lines = request.items.len(),
        redeem_points = draft.redeem_points,
        "Order placed"
    );

    Ok(PlacedOrder {
        order_id: created.id,
        order_number: created.order_number,
        redirect: format!("/orders/{}", created.id),
    })
}

/// Upload the held proof image and return its hosted URL.
async fn upload_proof<S: StateStore>(
    state: &AppState,
    store: &S,
    customer: &CurrentCustomer,
    proof: &ProofAttachment,
) -> Result<String> {
    let Some(stored) = state.proofs().get(proof.id).await else {
        warn!(proof_id = %proof.id, "Payment proof expired before confirmation");
        notifications::push(
            store,
            Notice::error("Your payment proof expired, please go back and attach it again"),
        )
        .await;
        return Err(CheckoutRejection::PaymentProofRequired.into());
    };

    match state
        .api()
        .upload_image(
            &customer.access_token,
            stored.bytes.clone(),
            &stored.file_name,
            &stored.content_type,
        )
        .await
    {
        Ok(uploaded) => Ok(uploaded.url),
        Err(e) => {
            warn!(error = %e, proof_id = %proof.id, "Payment proof upload failed");
            notifications::push(
                store,
                Notice::error("We couldn't upload your payment proof, your order was not placed"),
            )
            .await;
            Err(e.into())
        }
    }
}
