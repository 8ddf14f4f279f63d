//! Payment gateway webhook.
//!
//! `POST /api/stripe` must see the body exactly as sent: the signature is
//! computed over the raw bytes, so the handler takes [`Bytes`] and never a
//! JSON extractor.

use crate::server::state::AppState;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use quickstay_stripe::SIGNATURE_HEADER;
use quickstay_web::AppError;
use serde::{Deserialize, Serialize};

/// Acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always `true`
    pub received: bool,
}

/// Verify and reconcile one webhook delivery.
///
/// Any 2xx tells the gateway to stop redelivering, so only verified events
/// are acknowledged.
///
/// # Errors
///
/// - 400 for a missing or invalid signature, or a completed checkout without `bookingId`
/// - 404 for an unknown booking when unknown bookings are not acknowledged
/// - 500 / 502 for storage or gateway failures (the gateway retries)
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Missing Stripe-Signature header"))?;

    let outcome = state.reconciler.handle(&body, signature).await?;
    tracing::debug!(?outcome, "Webhook handled");

    Ok(Json(WebhookAck { received: true }))
}
