//! Sign-in session handlers.
//!
//! Customers authenticate against the backend, which issues a bearer token.
//! The client hands that token to `POST /api/auth/session`; the storefront
//! validates it with `GET /users/me` and remembers the customer in the session.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use franco_sport_core::UserId;

use crate::checkout::CheckoutService;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Body for `POST /api/auth/session`.
#[derive(Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// The signed-in customer, without the token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCustomer {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_points: Option<u64>,
}

/// Sign in with a backend-issued token.
///
/// Signing in as a different customer drops any checkout in progress; the
/// cart and wishlist carry over.
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SessionCustomer>> {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("token is required".to_string()));
    }

    let profile = state.api().current_customer(token).await?;
    let customer = CurrentCustomer {
        id: profile.id,
        email: profile.email.clone(),
        name: profile.name.clone(),
        access_token: token.to_string(),
    };

    // A checkout belongs to whoever started it
    let previous = session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten();
    if previous.as_ref().map(|c| c.id) != Some(customer.id) {
        CheckoutService::new(&state, &session, None).abandon().await;
    }

    // New identity, new session id
    if let Err(e) = session.cycle_id().await {
        tracing::warn!("Failed to cycle session id: {e}");
    }
    set_current_customer(&session, &customer)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;

    set_sentry_user(&customer.id, Some(&customer.email));
    tracing::info!(user_id = %customer.id, "Customer signed in");

    Ok(Json(SessionCustomer {
        id: profile.id,
        email: profile.email,
        name: profile.name,
        loyalty_points: Some(profile.loyalty_points),
    }))
}

/// Who is signed in.
#[instrument(skip_all)]
pub async fn current(RequireAuth(customer): RequireAuth) -> Json<SessionCustomer> {
    Json(SessionCustomer {
        id: customer.id,
        email: customer.email,
        name: customer.name,
        loyalty_points: None,
    })
}

/// Sign out. The cart and wishlist stay; a checkout in progress is dropped.
#[instrument(skip_all)]
pub async fn sign_out(State(state): State<AppState>, session: Session) -> StatusCode {
    CheckoutService::new(&state, &session, None).abandon().await;

    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    StatusCode::NO_CONTENT
}
