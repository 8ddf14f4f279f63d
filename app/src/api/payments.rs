//! Payment session endpoint.
//!
//! `POST /api/bookings/stripe-payment` opens a hosted checkout for an unpaid
//! booking and returns its URL. The browser is sent back to the request
//! `Origin` afterwards.

use crate::server::state::AppState;
use axum::{extract::State, Json};
use quickstay_core::BookingId;
use quickstay_web::{AppError, Caller, CorrelationId, RequestOrigin};
use serde::{Deserialize, Serialize};

/// Payment session request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionRequest {
    /// Booking to pay
    pub booking_id: BookingId,
}

/// Hosted checkout to redirect to.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    /// Always `true`
    pub success: bool,
    /// Checkout URL
    pub url: String,
}

/// Create a checkout session for a booking.
///
/// # Errors
///
/// - 404 if the booking or its room does not exist
/// - 409 if the booking is already paid
/// - 502 `Payment failed` if the gateway rejects the session
pub async fn create_payment_session(
    State(state): State<AppState>,
    caller: Caller,
    correlation_id: CorrelationId,
    RequestOrigin(origin): RequestOrigin,
    Json(request): Json<PaymentSessionRequest>,
) -> Result<Json<PaymentSessionResponse>, AppError> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        user_id = %caller.user_id,
        booking_id = %request.booking_id,
        "Requesting payment session"
    );

    let url = state
        .bookings
        .request_payment_session(request.booking_id, &origin)
        .await?;

    Ok(Json(PaymentSessionResponse { success: true, url }))
}
