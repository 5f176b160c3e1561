//! Wishlist state.
//!
//! Presence-only set of products: no quantities and no pricing rules. Order of
//! insertion is kept for display; membership checks go through a hash index.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Product, ProductId};

/// Product reference kept on the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&Product> for WishlistProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }
}

/// The visitor's wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredWishlist")]
pub struct Wishlist {
    items: Vec<WishlistProduct>,
    #[serde(skip)]
    index: HashSet<ProductId>,
}

#[derive(Deserialize)]
struct StoredWishlist {
    #[serde(default)]
    items: Vec<WishlistProduct>,
}

impl From<StoredWishlist> for Wishlist {
    fn from(stored: StoredWishlist) -> Self {
        let mut wishlist = Self::default();
        for item in stored.items {
            wishlist.insert(item);
        }
        wishlist
    }
}

impl Wishlist {
    /// Products in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[WishlistProduct] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn add(&mut self, product: &Product) -> bool {
        self.insert(WishlistProduct::from(product))
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        if !self.index.remove(&product_id) {
            return false;
        }
        self.items.retain(|item| item.id != product_id);
        true
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.index.contains(&product_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn insert(&mut self, item: WishlistProduct) -> bool {
        if !self.index.insert(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }
}
