//! Shipping addresses.
//!
//! Addresses are owned by the backend and scoped to the signed-in customer.
//! The storefront only lists them and creates new ones during checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::AddressId;

/// A stored shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Address fields entered inline at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Required address fields that were left blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required address fields: {}", .missing.join(", "))]
pub struct AddressValidationError {
    /// Wire names of the blank fields, in form order.
    pub missing: Vec<&'static str>,
}

impl NewAddress {
    /// Check that every required field has non-whitespace content.
    ///
    /// # Errors
    ///
    /// Returns `AddressValidationError` listing every blank field.
    pub fn validate(&self) -> Result<(), AddressValidationError> {
        let fields: [(&'static str, &str); 7] = [
            ("fullName", self.full_name.as_str()),
            ("streetAddress", self.street_address.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
            ("postalCode", self.postal_code.as_str()),
            ("country", self.country.as_str()),
            ("phone", self.phone.as_str()),
        ];

        let missing: Vec<&'static str> = fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressValidationError { missing })
        }
    }

    /// Copy with surrounding whitespace stripped from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            street_address: self.street_address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_default: self.is_default,
        }
    }
}
