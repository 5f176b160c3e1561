//! Session-backed cart.

use franco_sport_core::{AddOutcome, Cart, CartItem, CartKey, Product, Variant};

use super::{StateStore, load_or_default, persist};
use crate::models::session_keys;

/// Cart operations with write-through persistence under the `cart` key.
pub struct CartManager<'a, S> {
    store: &'a S,
}

impl<'a, S: StateStore> CartManager<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Current cart; empty when nothing (readable) is stored.
    pub async fn load(&self) -> Cart {
        load_or_default(self.store, session_keys::CART).await
    }

    /// Add `quantity` of a product (or variant), clamped to stock.
    pub async fn add(
        &self,
        product: &Product,
        variant: Option<&Variant>,
        quantity: u32,
    ) -> (Cart, AddOutcome) {
        self.mutate(|cart| {
            let outcome = cart.add_item(product, variant, quantity);
            (outcome != AddOutcome::Unchanged, outcome)
        })
        .await
    }

    /// Set a line's quantity. Returns `false` if nothing changed.
    pub async fn update_quantity(&self, key: &CartKey, quantity: u32) -> (Cart, bool) {
        self.mutate(|cart| {
            let changed = cart.update_quantity(key, quantity);
            (changed, changed)
        })
        .await
    }

    /// Remove a line, returning it if it existed.
    pub async fn remove(&self, key: &CartKey) -> (Cart, Option<CartItem>) {
        self.mutate(|cart| {
            let removed = cart.remove_item(key);
            (removed.is_some(), removed)
        })
        .await
    }

    /// Empty the cart.
    pub async fn clear(&self) -> Cart {
        let cart = Cart::default();
        persist(self.store, session_keys::CART, &cart).await;
        cart
    }

    /// Apply `f`, persisting when it reports a change.
    async fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> (bool, R)) -> (Cart, R) {
        let mut cart = self.load().await;
        let (changed, result) = f(&mut cart);
        if changed {
            persist(self.store, session_keys::CART, &cart).await;
        }
        (cart, result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use franco_sport_core::{Money, ProductId};

    use super::*;
    use crate::stores::testing::MemoryState;

    fn ball() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Match Ball".to_string(),
            slug: "match-ball".to_string(),
            price: Money::from_minor(10_000),
            stock: 10,
            image_url: None,
            variants: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_add_merges_and_persists() {
        let store = MemoryState::default();
        let carts = CartManager::new(&store);

        let (cart, _) = carts.add(&ball(), None, 2).await;
        assert_eq!(cart.subtotal(), Money::from_minor(20_000));

        let (cart, outcome) = carts.add(&ball(), None, 1).await;
        assert_eq!(outcome, AddOutcome::Incremented { quantity: 3 });
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.subtotal(), Money::from_minor(30_000));

        let reloaded = carts.load().await;
        assert_eq!(reloaded, cart);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = MemoryState::default();
        let carts = CartManager::new(&store);
        let key = CartKey::new(ProductId::new(1), None);

        carts.add(&ball(), None, 2).await;
        let (cart, changed) = carts.update_quantity(&key, 0).await;
        assert!(!changed);
        assert_eq!(cart.items_count(), 2);

        let (cart, changed) = carts.update_quantity(&key, 50).await;
        assert!(changed);
        assert_eq!(cart.items_count(), 10);

        let (cart, removed) = carts.remove(&key).await;
        assert!(removed.is_some());
        assert!(cart.is_empty());
        assert!(carts.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_in_memory_result() {
        let store = MemoryState::failing_writes();
        let carts = CartManager::new(&store);

        let (cart, outcome) = carts.add(&ball(), None, 2).await;
        assert_eq!(outcome, AddOutcome::Inserted { quantity: 2 });
        assert_eq!(cart.items_count(), 2);

        // Nothing reached storage
        assert!(store.raw(session_keys::CART).is_none());
        assert!(carts.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let store = MemoryState::default();
        let carts = CartManager::new(&store);
        carts.add(&ball(), None, 4).await;

        let cart = carts.clear().await;
        assert!(cart.is_empty());
        assert_eq!(
            store.raw(session_keys::CART).unwrap()["items"],
            serde_json::json!([])
        );
    }
}
