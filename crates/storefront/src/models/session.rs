//! Session-related types.
//!
//! Everything a visitor accumulates lives in their session record: cart,
//! wishlist, the checkout in progress, the signed-in customer and pending
//! notices.

use std::fmt;

use serde::{Deserialize, Serialize};

use franco_sport_core::UserId;

/// Session-stored customer identity.
///
/// The access token is the backend-issued bearer token; it is forwarded on
/// every customer-scoped backend call.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Backend user ID.
    pub id: UserId,
    /// Customer's email address.
    pub email: String,
    /// Display name, if the customer set one.
    #[serde(default)]
    pub name: Option<String>,
    /// Backend bearer token.
    pub access_token: String,
}

impl fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart snapshot.
    pub const CART: &str = "cart";

    /// Key for the wishlist snapshot.
    pub const WISHLIST: &str = "wishlist";

    /// Key for the checkout in progress.
    pub const CHECKOUT: &str = "checkout";

    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for queued notices.
    pub const NOTIFICATIONS: &str = "notifications";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let customer = CurrentCustomer {
            id: UserId::new(1),
            email: "ana@example.com".to_string(),
            name: None,
            access_token: "secret-token".to_string(),
        };
        let debug = format!("{customer:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("ana@example.com"));
    }
}
