//! Franco Sport backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every customer call carries the
//!   backend-issued bearer token
//! - The backend owns products, addresses, loyalty balances and orders; the
//!   storefront never stores them beyond a session
//! - Product lookups are cached in memory via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use franco_sport_storefront::api::BackendClient;
//!
//! let client = BackendClient::new(&config.api)?;
//! let product = client.get_product(ProductId::new(12)).await?;
//! let me = client.current_customer(&token).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{Customer, UploadedImage};

use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message suitable for showing to the shopper.
    ///
    /// Backend messages are passed through; transport failures get a generic line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::NotFound(what) => format!("{what} was not found"),
            _ => "The shop is not responding right now, please try again".to_string(),
        }
    }
}
