//! Payment method enums.
//!
//! The checkout works with [`PaymentMethod`], what the customer picks. The
//! backend only knows [`OrderPaymentMethod`], its enumerated column values.

use serde::{Deserialize, Serialize};

/// Payment method offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the courier on delivery. No extra input.
    CashOnDelivery,
    /// Scan the shop's QR code and transfer; needs an uploaded proof image.
    QrTransfer,
}

/// Payment method as stored on backend orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPaymentMethod {
    CashOnDelivery,
    BankTransfer,
}

impl From<PaymentMethod> for OrderPaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::CashOnDelivery => Self::CashOnDelivery,
            PaymentMethod::QrTransfer => Self::BankTransfer,
        }
    }
}
