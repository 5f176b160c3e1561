//! Catalog records as the backend returns them.
//!
//! Only the fields the cart and wishlist need are modeled; the backend sends
//! more (descriptions, categories, brand) and serde ignores the rest.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::price::Money;

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Money,
    /// Units available when the product has no variants.
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A specific configuration of a product (size, color) with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    /// Overrides the product price when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    pub stock: u32,
}

impl Product {
    /// Look up one of this product's variants.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Unit price for the product, or for `variant` if it overrides it.
    #[must_use]
    pub fn unit_price(&self, variant: Option<&Variant>) -> Money {
        variant.and_then(|v| v.price).unwrap_or(self.price)
    }

    /// Stock ceiling for the product, or for `variant` when one is chosen.
    #[must_use]
    pub fn available_stock(&self, variant: Option<&Variant>) -> u32 {
        variant.map_or(self.stock, |v| v.stock)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_backend_shape() {
        let json = r#"{
            "id": 4,
            "name": "Trail Runner",
            "slug": "trail-runner",
            "price": "89.90",
            "stock": 0,
            "description": "ignored",
            "variants": [
                { "id": 40, "name": "42 EU", "stock": 3 },
                { "id": 41, "name": "43 EU", "price": "94.90", "stock": 1 }
            ]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.variants.len(), 2);
        assert!(product.image_url.is_none());

        let v40 = product.variant(VariantId::new(40));
        let v41 = product.variant(VariantId::new(41));
        assert_eq!(product.unit_price(v40), Money::from_minor(8_990));
        assert_eq!(product.unit_price(v41), Money::from_minor(9_490));
        assert_eq!(product.available_stock(v41), 1);
        assert_eq!(product.available_stock(None), 0);
    }
}
