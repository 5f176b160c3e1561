//! Session-backed wishlist.

use franco_sport_core::{Product, ProductId, Wishlist};

use super::{StateStore, load_or_default, persist};
use crate::models::session_keys;

/// Wishlist operations with write-through persistence under the `wishlist` key.
pub struct WishlistManager<'a, S> {
    store: &'a S,
}

impl<'a, S: StateStore> WishlistManager<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Wishlist {
        load_or_default(self.store, session_keys::WISHLIST).await
    }

    /// Add a product; no-op when it is already present.
    pub async fn add(&self, product: &Product) -> (Wishlist, bool) {
        let mut wishlist = self.load().await;
        let added = wishlist.add(product);
        if added {
            persist(self.store, session_keys::WISHLIST, &wishlist).await;
        }
        (wishlist, added)
    }

    pub async fn remove(&self, product_id: ProductId) -> (Wishlist, bool) {
        let mut wishlist = self.load().await;
        let removed = wishlist.remove(product_id);
        if removed {
            persist(self.store, session_keys::WISHLIST, &wishlist).await;
        }
        (wishlist, removed)
    }

    pub async fn contains(&self, product_id: ProductId) -> bool {
        self.load().await.contains(product_id)
    }

    pub async fn clear(&self) -> Wishlist {
        let wishlist = Wishlist::default();
        persist(self.store, session_keys::WISHLIST, &wishlist).await;
        wishlist
    }
}
