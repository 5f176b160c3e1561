//! Checkout state machine.
//!
//! Checkout walks three steps, `address → payment → review`, and each step
//! carries exactly the data collected so far:
//!
//! ```text
//! Address { selected? } --advance--> Payment { address, method? } --advance--> Review { address, payment }
//!          <----------------back----------------           <----------------back---------------
//! ```
//!
//! Every transition returns the next state or a [`CheckoutRejection`] naming
//! what is missing. Forward moves need the step's data to be complete; steps
//! can never be skipped. `confirm` is only valid at review and hands back an
//! [`OrderDraft`] for submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::loyalty::{RedemptionBounds, discounted_total, points_value};
use crate::types::{AddressId, Money, PaymentMethod};

// =============================================================================
// State
// =============================================================================

/// Which step the customer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Address,
    Payment,
    Review,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Address => "address",
            Self::Payment => "payment",
            Self::Review => "review",
        })
    }
}

/// Metadata for an uploaded-later payment proof image.
///
/// The image bytes are held by the storefront; checkout only tracks that a
/// proof is attached and how to find it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofAttachment {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub attached_at: DateTime<Utc>,
}

/// Payment method chosen on the payment step, possibly still incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentChoice {
    CashOnDelivery,
    QrTransfer { proof: Option<ProofAttachment> },
}

/// Payment that passed validation and can be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ConfirmedPayment {
    CashOnDelivery,
    QrTransfer { proof: ProofAttachment },
}

impl PaymentChoice {
    fn new(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::CashOnDelivery => Self::CashOnDelivery,
            PaymentMethod::QrTransfer => Self::QrTransfer { proof: None },
        }
    }

    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::CashOnDelivery => PaymentMethod::CashOnDelivery,
            Self::QrTransfer { .. } => PaymentMethod::QrTransfer,
        }
    }

    #[must_use]
    pub const fn proof(&self) -> Option<&ProofAttachment> {
        match self {
            Self::QrTransfer { proof } => proof.as_ref(),
            Self::CashOnDelivery => None,
        }
    }

    fn confirm(&self) -> Result<ConfirmedPayment, CheckoutRejection> {
        match self {
            Self::CashOnDelivery => Ok(ConfirmedPayment::CashOnDelivery),
            Self::QrTransfer { proof: Some(proof) } => Ok(ConfirmedPayment::QrTransfer {
                proof: proof.clone(),
            }),
            Self::QrTransfer { proof: None } => Err(CheckoutRejection::PaymentProofRequired),
        }
    }
}

impl ConfirmedPayment {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::CashOnDelivery => PaymentMethod::CashOnDelivery,
            Self::QrTransfer { .. } => PaymentMethod::QrTransfer,
        }
    }

    #[must_use]
    pub const fn proof(&self) -> Option<&ProofAttachment> {
        match self {
            Self::QrTransfer { proof } => Some(proof),
            Self::CashOnDelivery => None,
        }
    }
}

impl From<ConfirmedPayment> for PaymentChoice {
    fn from(payment: ConfirmedPayment) -> Self {
        match payment {
            ConfirmedPayment::CashOnDelivery => Self::CashOnDelivery,
            ConfirmedPayment::QrTransfer { proof } => Self::QrTransfer { proof: Some(proof) },
        }
    }
}

/// Step plus the data gathered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CheckoutState {
    Address {
        selected: Option<AddressId>,
    },
    Payment {
        address: AddressId,
        method: Option<PaymentChoice>,
    },
    Review {
        address: AddressId,
        payment: ConfirmedPayment,
    },
}

impl CheckoutState {
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::Address { .. } => CheckoutStep::Address,
            Self::Payment { .. } => CheckoutStep::Payment,
            Self::Review { .. } => CheckoutStep::Review,
        }
    }
}

/// Why a checkout action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutRejection {
    #[error("sign in to check out")]
    Unauthenticated,
    #[error("cart is empty")]
    EmptyCart,
    #[error("select or create a shipping address first")]
    AddressRequired,
    #[error("choose a payment method first")]
    PaymentMethodRequired,
    #[error("attach a payment proof for QR transfer")]
    PaymentProofRequired,
    #[error("payment proof is only used with QR transfer")]
    ProofNotAccepted,
    #[error("cannot {action} during the {step} step")]
    WrongStep {
        action: &'static str,
        step: CheckoutStep,
    },
    #[error("already at the first step")]
    AtFirstStep,
    #[error("already at review; confirm the order instead")]
    AlreadyAtReview,
    #[error("points can be redeemed once an address is selected")]
    RedemptionUnavailable,
}

/// Facts the entry guard checks before checkout may start or resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryContext {
    pub authenticated: bool,
    pub cart_items: u32,
    pub loyalty_balance: u64,
}

/// Everything needed to build the order request, produced by `confirm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub address: AddressId,
    pub payment: ConfirmedPayment,
    pub redeem_points: u64,
}

/// Amounts shown next to the redemption control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

// =============================================================================
// Checkout
// =============================================================================

/// A checkout in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    state: CheckoutState,
    loyalty_balance: u64,
    redeem_points: u64,
}

impl Checkout {
    /// Entry guard: signed in and something in the cart.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `EmptyCart`.
    pub const fn check_entry(context: &EntryContext) -> Result<(), CheckoutRejection> {
        if !context.authenticated {
            return Err(CheckoutRejection::Unauthenticated);
        }
        if context.cart_items == 0 {
            return Err(CheckoutRejection::EmptyCart);
        }
        Ok(())
    }

    /// Start at the address step.
    ///
    /// # Errors
    ///
    /// Fails the entry guard (see [`Checkout::check_entry`]).
    pub fn begin(context: &EntryContext) -> Result<Self, CheckoutRejection> {
        Self::check_entry(context)?;
        Ok(Self {
            state: CheckoutState::Address { selected: None },
            loyalty_balance: context.loyalty_balance,
            redeem_points: 0,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.state.step()
    }

    #[must_use]
    pub const fn loyalty_balance(&self) -> u64 {
        self.loyalty_balance
    }

    /// Replace the cached balance after re-reading the customer profile.
    pub fn refresh_balance(&mut self, balance: u64) {
        self.loyalty_balance = balance;
    }

    #[must_use]
    pub const fn redeem_points(&self) -> u64 {
        self.redeem_points
    }

    #[must_use]
    pub const fn selected_address(&self) -> Option<AddressId> {
        match &self.state {
            CheckoutState::Address { selected } => *selected,
            CheckoutState::Payment { address, .. } | CheckoutState::Review { address, .. } => {
                Some(*address)
            }
        }
    }

    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        match &self.state {
            CheckoutState::Address { .. } => None,
            CheckoutState::Payment { method, .. } => match method {
                Some(choice) => Some(choice.method()),
                None => None,
            },
            CheckoutState::Review { payment, .. } => Some(payment.method()),
        }
    }

    #[must_use]
    pub const fn proof(&self) -> Option<&ProofAttachment> {
        match &self.state {
            CheckoutState::Address { .. } => None,
            CheckoutState::Payment { method, .. } => match method {
                Some(choice) => choice.proof(),
                None => None,
            },
            CheckoutState::Review { payment, .. } => payment.proof(),
        }
    }

    /// Pick the shipping address (address step only).
    ///
    /// # Errors
    ///
    /// `WrongStep` outside the address step.
    pub fn select_address(&mut self, id: AddressId) -> Result<(), CheckoutRejection> {
        match &mut self.state {
            CheckoutState::Address { selected } => {
                *selected = Some(id);
                Ok(())
            }
            other => Err(CheckoutRejection::WrongStep {
                action: "select an address",
                step: other.step(),
            }),
        }
    }

    /// Pick the payment method (payment step only).
    ///
    /// Re-selecting the current method keeps its proof; switching methods
    /// discards it. The discarded proof is returned so its bytes can be freed.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside the payment step.
    pub fn select_payment(
        &mut self,
        method: PaymentMethod,
    ) -> Result<Option<ProofAttachment>, CheckoutRejection> {
        let CheckoutState::Payment { method: current, .. } = &mut self.state else {
            return Err(CheckoutRejection::WrongStep {
                action: "choose a payment method",
                step: self.state.step(),
            });
        };

        if current.as_ref().map(PaymentChoice::method) == Some(method) {
            return Ok(None);
        }

        let previous = current.replace(PaymentChoice::new(method));
        Ok(previous.and_then(|choice| choice.proof().cloned()))
    }

    /// Attach a payment proof to a QR-transfer payment.
    ///
    /// Returns the proof it replaced, if any.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside the payment step, `ProofNotAccepted` when the
    /// chosen method is not QR transfer (or none is chosen).
    pub fn attach_proof(
        &mut self,
        attachment: ProofAttachment,
    ) -> Result<Option<ProofAttachment>, CheckoutRejection> {
        match &mut self.state {
            CheckoutState::Payment {
                method: Some(PaymentChoice::QrTransfer { proof }),
                ..
            } => Ok(proof.replace(attachment)),
            CheckoutState::Payment { .. } => Err(CheckoutRejection::ProofNotAccepted),
            other => Err(CheckoutRejection::WrongStep {
                action: "attach a payment proof",
                step: other.step(),
            }),
        }
    }

    /// Detach the payment proof, returning it.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside the payment step.
    pub fn remove_proof(&mut self) -> Result<Option<ProofAttachment>, CheckoutRejection> {
        match &mut self.state {
            CheckoutState::Payment {
                method: Some(PaymentChoice::QrTransfer { proof }),
                ..
            } => Ok(proof.take()),
            CheckoutState::Payment { .. } => Ok(None),
            other => Err(CheckoutRejection::WrongStep {
                action: "remove the payment proof",
                step: other.step(),
            }),
        }
    }

    /// Continue to the next step.
    ///
    /// # Errors
    ///
    /// `AddressRequired`, `PaymentMethodRequired`, `PaymentProofRequired`
    /// when the current step is incomplete; `AlreadyAtReview` at review.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutRejection> {
        let next = match &self.state {
            CheckoutState::Address { selected } => {
                let address = selected.ok_or(CheckoutRejection::AddressRequired)?;
                CheckoutState::Payment {
                    address,
                    method: None,
                }
            }
            CheckoutState::Payment { address, method } => {
                let choice = method
                    .as_ref()
                    .ok_or(CheckoutRejection::PaymentMethodRequired)?;
                CheckoutState::Review {
                    address: *address,
                    payment: choice.confirm()?,
                }
            }
            CheckoutState::Review { .. } => return Err(CheckoutRejection::AlreadyAtReview),
        };

        self.state = next;
        Ok(self.step())
    }

    /// Go back one step, keeping what was already chosen.
    ///
    /// # Errors
    ///
    /// `AtFirstStep` at the address step.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutRejection> {
        let previous = match &self.state {
            CheckoutState::Address { .. } => return Err(CheckoutRejection::AtFirstStep),
            CheckoutState::Payment { address, .. } => CheckoutState::Address {
                selected: Some(*address),
            },
            CheckoutState::Review { address, payment } => CheckoutState::Payment {
                address: *address,
                method: Some(payment.clone().into()),
            },
        };

        self.state = previous;
        Ok(self.step())
    }

    /// Redemption range for the current balance and `subtotal`.
    #[must_use]
    pub fn redemption_bounds(&self, subtotal: Money) -> RedemptionBounds {
        RedemptionBounds::new(self.loyalty_balance, subtotal)
    }

    /// Set the points to redeem, snapped to the selectable range.
    ///
    /// Returns the amount actually selected.
    ///
    /// # Errors
    ///
    /// `RedemptionUnavailable` while still on the address step.
    pub fn set_redemption(
        &mut self,
        requested: u64,
        subtotal: Money,
    ) -> Result<u64, CheckoutRejection> {
        if self.step() == CheckoutStep::Address {
            return Err(CheckoutRejection::RedemptionUnavailable);
        }
        self.redeem_points = self.redemption_bounds(subtotal).select(requested);
        Ok(self.redeem_points)
    }

    /// Subtotal, discount and total for the current redemption.
    ///
    /// The redemption is re-clamped to `subtotal`, which may have shrunk since
    /// the points were chosen.
    #[must_use]
    pub fn totals(&self, subtotal: Money) -> CheckoutTotals {
        let points = self.effective_redemption(subtotal);
        CheckoutTotals {
            subtotal,
            discount: points_value(points),
            total: discounted_total(subtotal, points),
        }
    }

    /// Finish checkout and produce the order draft (review step only).
    ///
    /// # Errors
    ///
    /// `WrongStep` outside the review step.
    pub fn confirm(&self, subtotal: Money) -> Result<OrderDraft, CheckoutRejection> {
        let CheckoutState::Review { address, payment } = &self.state else {
            return Err(CheckoutRejection::WrongStep {
                action: "confirm the order",
                step: self.step(),
            });
        };

        Ok(OrderDraft {
            address: *address,
            payment: payment.clone(),
            redeem_points: self.effective_redemption(subtotal),
        })
    }

    fn effective_redemption(&self, subtotal: Money) -> u64 {
        self.redeem_points.min(self.redemption_bounds(subtotal).max)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn context() -> EntryContext {
        EntryContext {
            authenticated: true,
            cart_items: 2,
            loyalty_balance: 5_000,
        }
    }

    fn proof() -> ProofAttachment {
        ProofAttachment {
            id: Uuid::new_v4(),
            file_name: "transfer.png".to_string(),
            content_type: "image/png".to_string(),
            size_bytes: 2_048,
            attached_at: Utc::now(),
        }
    }

    fn at_payment() -> Checkout {
        let mut checkout = Checkout::begin(&context()).unwrap();
        checkout.select_address(AddressId::new(1)).unwrap();
        checkout.advance().unwrap();
        checkout
    }

    #[test]
    fn test_entry_guard() {
        let unauthenticated = EntryContext {
            authenticated: false,
            ..context()
        };
        assert_eq!(
            Checkout::begin(&unauthenticated).err(),
            Some(CheckoutRejection::Unauthenticated)
        );

        let empty = EntryContext {
            cart_items: 0,
            ..context()
        };
        assert_eq!(
            Checkout::begin(&empty).err(),
            Some(CheckoutRejection::EmptyCart)
        );

        let checkout = Checkout::begin(&context()).unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Address);
        assert_eq!(checkout.loyalty_balance(), 5_000);
    }

    #[test]
    fn test_address_required_to_advance() {
        let mut checkout = Checkout::begin(&context()).unwrap();
        assert_eq!(
            checkout.advance(),
            Err(CheckoutRejection::AddressRequired)
        );

        checkout.select_address(AddressId::new(9)).unwrap();
        assert_eq!(checkout.advance(), Ok(CheckoutStep::Payment));
        assert_eq!(checkout.selected_address(), Some(AddressId::new(9)));
    }

    #[test]
    fn test_payment_method_required_to_advance() {
        let mut checkout = at_payment();
        assert_eq!(
            checkout.advance(),
            Err(CheckoutRejection::PaymentMethodRequired)
        );
    }

    #[test]
    fn test_qr_transfer_without_proof_is_rejected() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::QrTransfer).unwrap();

        assert_eq!(
            checkout.advance(),
            Err(CheckoutRejection::PaymentProofRequired)
        );
        assert_eq!(checkout.step(), CheckoutStep::Payment);

        checkout.attach_proof(proof()).unwrap();
        assert_eq!(checkout.advance(), Ok(CheckoutStep::Review));
        assert!(checkout.proof().is_some());
    }

    #[test]
    fn test_removing_proof_blocks_review_again() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::QrTransfer).unwrap();
        let attached = proof();
        checkout.attach_proof(attached.clone()).unwrap();

        assert_eq!(checkout.remove_proof(), Ok(Some(attached)));
        assert!(checkout.proof().is_none());
        assert_eq!(
            checkout.advance(),
            Err(CheckoutRejection::PaymentProofRequired)
        );
    }

    #[test]
    fn test_switching_method_discards_proof() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::QrTransfer).unwrap();
        let attached = proof();
        checkout.attach_proof(attached.clone()).unwrap();

        assert_eq!(checkout.select_payment(PaymentMethod::QrTransfer), Ok(None));
        assert!(checkout.proof().is_some());

        assert_eq!(
            checkout.select_payment(PaymentMethod::CashOnDelivery),
            Ok(Some(attached))
        );
        assert!(checkout.proof().is_none());
        assert_eq!(
            checkout.attach_proof(proof()),
            Err(CheckoutRejection::ProofNotAccepted)
        );
        assert_eq!(checkout.advance(), Ok(CheckoutStep::Review));
    }

    #[test]
    fn test_back_keeps_choices() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::CashOnDelivery).unwrap();
        checkout.advance().unwrap();

        assert_eq!(checkout.back(), Ok(CheckoutStep::Payment));
        assert_eq!(checkout.payment_method(), Some(PaymentMethod::CashOnDelivery));

        assert_eq!(checkout.back(), Ok(CheckoutStep::Address));
        assert_eq!(checkout.selected_address(), Some(AddressId::new(1)));
        assert_eq!(checkout.back(), Err(CheckoutRejection::AtFirstStep));
    }

    #[test]
    fn test_actions_are_tied_to_their_step() {
        let mut checkout = Checkout::begin(&context()).unwrap();
        assert!(matches!(
            checkout.select_payment(PaymentMethod::CashOnDelivery),
            Err(CheckoutRejection::WrongStep {
                step: CheckoutStep::Address,
                ..
            })
        ));
        assert!(matches!(
            checkout.confirm(Money::from_minor(1_000)),
            Err(CheckoutRejection::WrongStep { .. })
        ));

        let mut checkout = at_payment();
        assert!(matches!(
            checkout.select_address(AddressId::new(2)),
            Err(CheckoutRejection::WrongStep {
                step: CheckoutStep::Payment,
                ..
            })
        ));
    }

    #[test]
    fn test_review_cannot_advance() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::CashOnDelivery).unwrap();
        checkout.advance().unwrap();
        assert_eq!(checkout.advance(), Err(CheckoutRejection::AlreadyAtReview));
    }

    #[test]
    fn test_redemption_needs_address() {
        let mut checkout = Checkout::begin(&context()).unwrap();
        assert_eq!(
            checkout.set_redemption(100, Money::from_minor(3_000)),
            Err(CheckoutRejection::RedemptionUnavailable)
        );
    }

    #[test]
    fn test_max_redemption_zeroes_total() {
        let subtotal = Money::from_minor(3_000);
        let mut checkout = at_payment();

        assert_eq!(checkout.redemption_bounds(subtotal).max, 3_000);
        assert_eq!(checkout.set_redemption(u64::MAX, subtotal), Ok(3_000));

        let totals = checkout.totals(subtotal);
        assert_eq!(totals.discount, Money::from_minor(3_000));
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn test_confirm_reclamps_redemption_to_current_subtotal() {
        let mut checkout = at_payment();
        checkout
            .set_redemption(4_000, Money::from_minor(10_000))
            .unwrap();
        checkout.select_payment(PaymentMethod::CashOnDelivery).unwrap();
        checkout.advance().unwrap();

        let draft = checkout.confirm(Money::from_minor(2_500)).unwrap();
        assert_eq!(draft.redeem_points, 2_500);
        assert_eq!(draft.address, AddressId::new(1));
        assert_eq!(draft.payment, ConfirmedPayment::CashOnDelivery);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut checkout = at_payment();
        checkout.select_payment(PaymentMethod::QrTransfer).unwrap();
        checkout.attach_proof(proof()).unwrap();

        let json = serde_json::to_value(&checkout).unwrap();
        assert_eq!(json["state"]["step"], "payment");
        assert_eq!(json["state"]["method"]["method"], "qr_transfer");

        let restored: Checkout = serde_json::from_value(json).unwrap();
        assert_eq!(restored, checkout);
    }
}
