//! Checkout route handlers.
//!
//! Every handler runs the entry guard first: a signed-out visitor gets 401
//! with `redirect: "/login"`, an empty cart gets 409 with `redirect: "/cart"`.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use franco_sport_core::{Address, AddressId, NewAddress, PaymentMethod};

use crate::checkout::{CheckoutService, CheckoutView, PlacedOrder};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Multipart field carrying the proof image.
pub const PROOF_FIELD: &str = "proof";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectAddressRequest {
    pub address_id: AddressId,
}

#[derive(Debug, Deserialize)]
pub struct SelectPaymentRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct RedemptionRequest {
    pub points: u64,
}

/// New address plus the checkout with it selected.
#[derive(Debug, Serialize)]
pub struct CreatedAddressResponse {
    pub address: Address,
    pub checkout: CheckoutView,
}

/// Begin or resume checkout.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.resume().await?))
}

/// Abandon checkout.
#[instrument(skip_all)]
pub async fn abandon(State(state): State<AppState>, session: Session) -> StatusCode {
    CheckoutService::new(&state, &session, None).abandon().await;
    StatusCode::NO_CONTENT
}

#[instrument(skip_all)]
pub async fn addresses(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<Vec<Address>>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.addresses().await?))
}

/// Create an address inline and select it.
#[instrument(skip_all)]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<NewAddress>,
) -> Result<(StatusCode, Json<CreatedAddressResponse>)> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    let (address, checkout) = service.create_address(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedAddressResponse { address, checkout }),
    ))
}

#[instrument(skip(state, session, customer))]
pub async fn select_address(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<SelectAddressRequest>,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.select_address(body.address_id).await?))
}

#[instrument(skip(state, session, customer))]
pub async fn select_payment(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<SelectPaymentRequest>,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.select_payment(body.method).await?))
}

/// Attach a payment proof image (multipart field `proof`).
#[instrument(skip_all)]
pub async fn attach_proof(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    mut multipart: Multipart,
) -> Result<Json<CheckoutView>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PROOF_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let service = CheckoutService::new(&state, &session, customer.as_ref());
        let view = service
            .attach_proof(&file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok(Json(view));
    }

    Err(AppError::BadRequest(format!(
        "missing multipart field '{PROOF_FIELD}'"
    )))
}

#[instrument(skip_all)]
pub async fn remove_proof(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.remove_proof().await?))
}

#[instrument(skip(state, session, customer))]
pub async fn set_redemption(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<RedemptionRequest>,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.set_redemption(body.points).await?))
}

/// Continue to the next step.
#[instrument(skip_all)]
pub async fn advance(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.advance().await?))
}

#[instrument(skip_all)]
pub async fn back(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<CheckoutView>> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    Ok(Json(service.back().await?))
}

/// Place the order.
#[instrument(skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let service = CheckoutService::new(&state, &session, customer.as_ref());
    let placed = service.confirm().await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("payment proof exceeds the upload limit".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
