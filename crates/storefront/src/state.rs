//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, BackendClient};
use crate::checkout::ProofVault;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: BackendClient,
    proofs: ProofVault,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = BackendClient::new(&config.api)?;
        let proofs = ProofVault::new(config.proofs);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                proofs,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &BackendClient {
        &self.inner.api
    }

    /// Get a reference to the payment proof holding area.
    #[must_use]
    pub fn proofs(&self) -> &ProofVault {
        &self.inner.proofs
    }
}
