//! Backend response types that only the storefront consumes.

use serde::{Deserialize, Serialize};

use franco_sport_core::UserId;

/// Profile returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Current loyalty balance. Missing means zero.
    #[serde(default)]
    pub loyalty_points: u64,
}

/// Result of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Error body shapes the backend uses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message from a raw error body.
    pub(crate) fn message_from(raw: &str) -> String {
        serde_json::from_str::<Self>(raw)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| raw.chars().take(200).collect())
    }
}
