//! Checkout orchestration over the session and the backend.

use serde::Serialize;
use tracing::{debug, info};

use franco_sport_core::{
    Address, AddressId, Cart, Checkout, CheckoutRejection, CheckoutStep, CheckoutTotals,
    EntryContext, NewAddress, PaymentMethod, ProofAttachment,
};

use super::submit::{PlacedOrder, submit};
use crate::error::{AppError, Result};
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;
use crate::stores::{CartManager, StateStore, forget, load_or_default, persist};

// =============================================================================
// Views
// =============================================================================

/// Everything the checkout page renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub selected_address: Option<AddressId>,
    pub payment_method: Option<PaymentMethod>,
    pub proof: Option<ProofView>,
    /// Whether `continue` would be accepted right now.
    pub can_continue: bool,
    pub cart: Cart,
    pub redemption: RedemptionView,
    pub totals: CheckoutTotals,
}

/// Attached proof plus its inline preview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofView {
    #[serde(flatten)]
    pub attachment: ProofAttachment,
    /// `None` once the held image has expired.
    pub preview_url: Option<String>,
}

/// State of the loyalty redemption control.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionView {
    pub available: bool,
    pub balance: u64,
    pub max: u64,
    pub step: u64,
    pub points: u64,
}

// =============================================================================
// CheckoutService
// =============================================================================

/// One visitor's checkout, stored in their session under `checkout`.
pub struct CheckoutService<'a, S> {
    state: &'a AppState,
    store: &'a S,
    customer: Option<&'a CurrentCustomer>,
}

impl<'a, S: StateStore> CheckoutService<'a, S> {
    #[must_use]
    pub const fn new(
        state: &'a AppState,
        store: &'a S,
        customer: Option<&'a CurrentCustomer>,
    ) -> Self {
        Self {
            state,
            store,
            customer,
        }
    }

    /// Begin checkout, or resume the one in progress with a fresh loyalty balance.
    ///
    /// # Errors
    ///
    /// Entry guard rejections, or a backend error fetching the balance.
    pub async fn resume(&self) -> Result<CheckoutView> {
        let customer = self.customer()?;
        let cart = self.guarded_cart().await?;
        let profile = self
            .state
            .api()
            .current_customer(&customer.access_token)
            .await?;

        let checkout = match self.stored().await {
            Some(mut checkout) => {
                checkout.refresh_balance(profile.loyalty_points);
                checkout
            }
            None => {
                info!(user_id = %customer.id, "Checkout started");
                Checkout::begin(&EntryContext {
                    authenticated: true,
                    cart_items: cart.items_count(),
                    loyalty_balance: profile.loyalty_points,
                })?
            }
        };

        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Drop the checkout and any held proof image.
    pub async fn abandon(&self) {
        if let Some(checkout) = self.stored().await {
            if let Some(proof) = checkout.proof() {
                self.state.proofs().discard(proof.id).await;
            }
            info!(step = %checkout.step(), "Checkout abandoned");
        }
        forget(self.store, session_keys::CHECKOUT).await;
    }

    /// Saved addresses the customer can ship to.
    ///
    /// # Errors
    ///
    /// Entry guard rejections, or a backend error.
    pub async fn addresses(&self) -> Result<Vec<Address>> {
        let customer = self.customer()?;
        self.guarded_cart().await?;
        Ok(self
            .state
            .api()
            .list_addresses(&customer.access_token)
            .await?)
    }

    /// Create an address from the inline form and select it.
    ///
    /// # Errors
    ///
    /// `AddressValidationError` for blank fields (checked before any backend
    /// call), `WrongStep` outside the address step, or a backend error.
    pub async fn create_address(&self, address: &NewAddress) -> Result<(Address, CheckoutView)> {
        let customer = self.customer()?;
        let (mut checkout, cart) = self.active().await?;

        let address = address.trimmed();
        address.validate()?;
        if checkout.step() != CheckoutStep::Address {
            return Err(CheckoutRejection::WrongStep {
                action: "select an address",
                step: checkout.step(),
            }
            .into());
        }

        let created = self
            .state
            .api()
            .create_address(&customer.access_token, &address)
            .await?;
        checkout.select_address(created.id)?;
        self.save(&checkout).await;

        info!(address_id = %created.id, "Address created at checkout");
        Ok((created, self.view(&checkout, cart).await))
    }

    /// Select one of the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// `NotFound` if the address is not the customer's, or a state machine rejection.
    pub async fn select_address(&self, id: AddressId) -> Result<CheckoutView> {
        let customer = self.customer()?;
        let (mut checkout, cart) = self.active().await?;

        let addresses = self
            .state
            .api()
            .list_addresses(&customer.access_token)
            .await?;
        if !addresses.iter().any(|address| address.id == id) {
            return Err(AppError::NotFound(format!("Address {id}")));
        }

        checkout.select_address(id)?;
        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Choose the payment method, discarding a proof that no longer applies.
    ///
    /// # Errors
    ///
    /// State machine rejections.
    pub async fn select_payment(&self, method: PaymentMethod) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;

        if let Some(discarded) = checkout.select_payment(method)? {
            debug!(proof_id = %discarded.id, "Discarding proof after method change");
            self.state.proofs().discard(discarded.id).await;
        }

        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Hold an uploaded proof image and attach it to the QR-transfer payment.
    ///
    /// # Errors
    ///
    /// Invalid image, or a state machine rejection (the image is not kept).
    pub async fn attach_proof(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;

        let attachment = self
            .state
            .proofs()
            .accept(file_name, content_type, bytes)
            .await?;
        let attachment_id = attachment.id;

        match checkout.attach_proof(attachment) {
            Ok(Some(replaced)) => self.state.proofs().discard(replaced.id).await,
            Ok(None) => {}
            Err(rejection) => {
                self.state.proofs().discard(attachment_id).await;
                return Err(rejection.into());
            }
        }

        info!(proof_id = %attachment_id, "Payment proof attached");
        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Detach the proof and drop its image.
    ///
    /// # Errors
    ///
    /// State machine rejections.
    pub async fn remove_proof(&self) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;

        if let Some(removed) = checkout.remove_proof()? {
            self.state.proofs().discard(removed.id).await;
        }

        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Choose how many points to redeem.
    ///
    /// # Errors
    ///
    /// `RedemptionUnavailable` on the address step.
    pub async fn set_redemption(&self, points: u64) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;

        let selected = checkout.set_redemption(points, cart.subtotal())?;
        debug!(requested = points, selected, "Redemption updated");

        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Continue to the next step.
    ///
    /// # Errors
    ///
    /// The current step is incomplete, or already at review.
    pub async fn advance(&self) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;
        let step = checkout.advance()?;
        debug!(%step, "Checkout advanced");
        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Go back one step, keeping what was entered.
    ///
    /// # Errors
    ///
    /// `AtFirstStep` on the address step.
    pub async fn back(&self) -> Result<CheckoutView> {
        let (mut checkout, cart) = self.active().await?;
        let step = checkout.back()?;
        debug!(%step, "Checkout went back");
        self.save(&checkout).await;
        Ok(self.view(&checkout, cart).await)
    }

    /// Place the order.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside review, proof upload or order creation failures.
    /// On failure the cart and the review step are left as they were.
    pub async fn confirm(&self) -> Result<PlacedOrder> {
        let customer = self.customer()?;
        let (checkout, cart) = self.active().await?;
        submit(self.state, self.store, customer, &checkout, &cart).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn customer(&self) -> std::result::Result<&'a CurrentCustomer, CheckoutRejection> {
        self.customer.ok_or(CheckoutRejection::Unauthenticated)
    }

    /// Entry guard: signed in and a non-empty cart.
    async fn guarded_cart(&self) -> Result<Cart> {
        let cart = CartManager::new(self.store).load().await;
        Checkout::check_entry(&EntryContext {
            authenticated: self.customer.is_some(),
            cart_items: cart.items_count(),
            loyalty_balance: 0,
        })?;
        Ok(cart)
    }

    /// Stored checkout (or a new one) behind the entry guard.
    async fn active(&self) -> Result<(Checkout, Cart)> {
        let cart = self.guarded_cart().await?;
        if let Some(checkout) = self.stored().await {
            return Ok((checkout, cart));
        }

        let customer = self.customer()?;
        let profile = self
            .state
            .api()
            .current_customer(&customer.access_token)
            .await?;
        let checkout = Checkout::begin(&EntryContext {
            authenticated: true,
            cart_items: cart.items_count(),
            loyalty_balance: profile.loyalty_points,
        })?;
        info!(user_id = %customer.id, "Checkout started");
        Ok((checkout, cart))
    }

    async fn stored(&self) -> Option<Checkout> {
        load_or_default(self.store, session_keys::CHECKOUT).await
    }

    async fn save(&self, checkout: &Checkout) {
        persist(self.store, session_keys::CHECKOUT, checkout).await;
    }

    async fn view(&self, checkout: &Checkout, cart: Cart) -> CheckoutView {
        let subtotal = cart.subtotal();
        let bounds = checkout.redemption_bounds(subtotal);
        let totals = checkout.totals(subtotal);

        let proof = match checkout.proof() {
            Some(attachment) => Some(ProofView {
                attachment: attachment.clone(),
                preview_url: self.state.proofs().preview_url(attachment.id).await,
            }),
            None => None,
        };

        let can_continue =
            checkout.step() != CheckoutStep::Review && checkout.clone().advance().is_ok();

        CheckoutView {
            step: checkout.step(),
            selected_address: checkout.selected_address(),
            payment_method: checkout.payment_method(),
            proof,
            can_continue,
            redemption: RedemptionView {
                available: checkout.step() != CheckoutStep::Address && bounds.is_available(),
                balance: checkout.loyalty_balance(),
                max: bounds.max,
                step: bounds.step,
                points: checkout.redeem_points().min(bounds.max),
            },
            totals,
            cart,
        }
    }
}
