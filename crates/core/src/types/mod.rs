//! Core types for Franco Sport.
//!
//! Type-safe wrappers and records for the storefront's domain concepts.

pub mod address;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use address::{Address, AddressValidationError, NewAddress};
pub use id::*;
pub use price::Money;
pub use product::{Product, Variant};
pub use status::{OrderPaymentMethod, PaymentMethod};
