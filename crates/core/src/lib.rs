//! Franco Sport Core - Shared domain library.
//!
//! This crate holds the storefront's domain logic with no I/O attached:
//! - `storefront` - JSON storefront that owns sessions and talks to the backend
//! - `cli` - Command-line tools for session-store migrations and config checks
//!
//! # Architecture
//!
//! Everything here is plain data and pure functions. No database access, no
//! HTTP clients, no clocks beyond what callers pass in. The storefront wires
//! these types to sessions and the backend REST API.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money, products, addresses, payment methods
//! - [`cart`] - Cart state with composite-key merging and derived totals
//! - [`wishlist`] - Set-semantics product wishlist
//! - [`loyalty`] - Loyalty point redemption bounds and conversion
//! - [`checkout`] - Checkout state machine (address, payment, review)
//! - [`order`] - Order submission payload

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod loyalty;
pub mod order;
pub mod types;
pub mod wishlist;

pub use cart::{AddOutcome, Cart, CartItem, CartKey, CartKeyError, CartProduct};
pub use checkout::{
    Checkout, CheckoutRejection, CheckoutState, CheckoutStep, CheckoutTotals, ConfirmedPayment,
    EntryContext, OrderDraft, PaymentChoice, ProofAttachment,
};
pub use loyalty::{POINTS_PER_CURRENCY_UNIT, REDEMPTION_STEP, RedemptionBounds};
pub use order::{CreatedOrder, OrderLine, OrderRequest};
pub use types::*;
pub use wishlist::{Wishlist, WishlistProduct};
