//! Order submission payload.
//!
//! Built once per successful checkout from the cart and the confirmed
//! [`OrderDraft`]. Optional fields are left out of the JSON entirely rather
//! than sent as `null` or zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::checkout::OrderDraft;
use crate::types::{AddressId, Money, OrderId, OrderPaymentMethod, ProductId, VariantId};

/// One ordered product (or variant) and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            variant_id: item.variant_id,
            quantity: item.quantity,
        }
    }
}

/// Request body for the backend's order-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address_id: AddressId,
    pub payment_method: OrderPaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeem_points: Option<u64>,
}

impl OrderRequest {
    /// Assemble the payload.
    ///
    /// `payment_proof_url` must already hold the uploaded proof's URL when the
    /// payment method needs one; it is passed through as given.
    #[must_use]
    pub fn new(cart: &Cart, draft: &OrderDraft, payment_proof_url: Option<String>) -> Self {
        Self {
            items: cart.items().iter().map(OrderLine::from).collect(),
            shipping_address_id: draft.address,
            payment_method: draft.payment.method().into(),
            payment_proof_url,
            redeem_points: (draft.redeem_points > 0).then_some(draft.redeem_points),
        }
    }
}

/// The backend's answer to a successful order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
