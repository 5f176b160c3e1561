//! Cart state.
//!
//! A cart is an ordered list of line items, unique on the composite key
//! `(product_id, variant_id)`. Adding an existing key increments its quantity
//! instead of creating a second line. Quantities are clamped to the stock seen
//! at add time; excess is dropped silently.
//!
//! `items_count` and `subtotal` are cached and recomputed after every mutation
//! and whenever a snapshot is loaded, so they always agree with the lines.
//!
//! # Example
//!
//! ```rust
//! use franco_sport_core::{Cart, Money, Product, ProductId};
//!
//! let ball = Product {
//!     id: ProductId::new(1),
//!     name: "Match Ball".to_string(),
//!     slug: "match-ball".to_string(),
//!     price: Money::from_minor(10_000),
//!     stock: 10,
//!     image_url: None,
//!     variants: Vec::new(),
//! };
//!
//! let mut cart = Cart::default();
//! cart.add_item(&ball, None, 2);
//! cart.add_item(&ball, None, 1);
//! assert_eq!(cart.items().len(), 1);
//! assert_eq!(cart.items_count(), 3);
//! assert_eq!(cart.subtotal(), Money::from_minor(30_000));
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, Product, ProductId, Variant, VariantId};

// =============================================================================
// CartKey
// =============================================================================

/// Composite identity of a cart line.
///
/// Rendered as `"{product}"` or `"{product}:{variant}"`; that string is the
/// line id used by update and remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CartKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

/// A line id that is not `"{product}"` or `"{product}:{variant}"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cart item id: {0}")]
pub struct CartKeyError(pub String);

impl CartKey {
    #[must_use]
    pub const fn new(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            product_id,
            variant_id,
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_id {
            Some(variant) => write!(f, "{}:{variant}", self.product_id),
            None => write!(f, "{}", self.product_id),
        }
    }
}

impl FromStr for CartKey {
    type Err = CartKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CartKeyError(s.to_string());
        match s.split_once(':') {
            Some((product, variant)) => Ok(Self::new(
                product.parse().map_err(|_| invalid())?,
                Some(variant.parse().map_err(|_| invalid())?),
            )),
            None => Ok(Self::new(s.parse().map_err(|_| invalid())?, None)),
        }
    }
}

impl TryFrom<String> for CartKey {
    type Error = CartKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CartKey> for String {
    fn from(key: CartKey) -> Self {
        key.to_string()
    }
}

// =============================================================================
// CartItem
// =============================================================================

/// Denormalized product data kept on a line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartKey,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    /// Unit price captured when the line was first added.
    pub price_at_add: Money,
    /// Stock seen on the most recent add; caps quantity updates.
    pub max_quantity: u32,
    pub product: CartProduct,
}

impl CartItem {
    /// `price_at_add × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price_at_add.times(self.quantity)
    }
}

/// What `Cart::add_item` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended with this quantity.
    Inserted { quantity: u32 },
    /// An existing line now has this quantity.
    Incremented { quantity: u32 },
    /// Nothing changed: zero requested, out of stock, or already at the cap.
    Unchanged,
}

// =============================================================================
// Cart
// =============================================================================

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCart")]
pub struct Cart {
    items: Vec<CartItem>,
    items_count: u32,
    subtotal: Money,
}

/// Persisted snapshot shape. Derived values in the snapshot are ignored.
#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl From<StoredCart> for Cart {
    fn from(stored: StoredCart) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(stored.items.len());
        for item in stored.items {
            if item.quantity == 0 || items.iter().any(|existing| existing.id == item.id) {
                continue;
            }
            items.push(item);
        }

        let mut cart = Self {
            items,
            ..Self::default()
        };
        cart.recompute();
        cart
    }
}

impl Cart {
    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by its key.
    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == *key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub const fn items_count(&self) -> u32 {
        self.items_count
    }

    /// Sum of `price_at_add × quantity` across all lines.
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Add `quantity` units of a product (or one of its variants).
    ///
    /// An existing line for the same key is incremented and its stock ceiling
    /// refreshed from `product`; its price snapshot is kept. A new line takes
    /// the current unit price. Either way the quantity never exceeds stock.
    pub fn add_item(
        &mut self,
        product: &Product,
        variant: Option<&Variant>,
        quantity: u32,
    ) -> AddOutcome {
        if quantity == 0 {
            return AddOutcome::Unchanged;
        }

        let key = CartKey::new(product.id, variant.map(|v| v.id));
        let stock = product.available_stock(variant);

        let outcome = if let Some(item) = self.items.iter_mut().find(|item| item.id == key) {
            item.max_quantity = stock;
            let next = item.quantity.saturating_add(quantity).min(stock);
            if next > item.quantity {
                item.quantity = next;
                AddOutcome::Incremented { quantity: next }
            } else {
                AddOutcome::Unchanged
            }
        } else if stock == 0 {
            AddOutcome::Unchanged
        } else {
            let quantity = quantity.min(stock);
            self.items.push(CartItem {
                id: key,
                product_id: product.id,
                variant_id: key.variant_id,
                quantity,
                price_at_add: product.unit_price(variant),
                max_quantity: stock,
                product: CartProduct {
                    name: product.name.clone(),
                    slug: product.slug.clone(),
                    image_url: product.image_url.clone(),
                    variant_name: variant.map(|v| v.name.clone()),
                },
            });
            AddOutcome::Inserted { quantity }
        };

        self.recompute();
        outcome
    }

    /// Set a line's quantity, clamped to its stock ceiling.
    ///
    /// Returns `false` without touching the cart when `quantity < 1` or the
    /// line does not exist.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id == *key) else {
            return false;
        };

        item.quantity = quantity.min(item.max_quantity.max(1));
        self.recompute();
        true
    }

    /// Remove a line, returning it if it existed.
    pub fn remove_item(&mut self, key: &CartKey) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == *key)?;
        let removed = self.items.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.items_count = self
            .items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity));
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
    }
}
