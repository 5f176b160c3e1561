//! Checkout flow for the storefront.
//!
//! The step machine itself lives in `franco_sport_core::checkout`; this module
//! wires it to the session, the backend and the in-memory proof images.
//!
//! # Flow
//!
//! ```text
//! GET  /api/checkout            entry guard, begin or resume
//! POST /api/checkout/address    select  ─┐
//! POST /api/checkout/addresses  create  ─┴─ continue ─> payment
//! POST /api/checkout/payment    method  ─┐
//! POST /api/checkout/proof      image   ─┴─ continue ─> review
//! POST /api/checkout/confirm    upload proof, then create order
//! ```

pub mod proof;
mod service;
mod submit;

pub use proof::{ProofError, ProofVault, StoredProof};
pub use service::{CheckoutService, CheckoutView, ProofView, RedemptionView};
pub use submit::PlacedOrder;
