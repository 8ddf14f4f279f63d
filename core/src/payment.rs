//! Payment gateway abstraction.
//!
//! The gateway is an opaque collaborator with two surfaces:
//!
//! 1. An API to create hosted checkout sessions and to list the sessions of a
//!    payment intent
//! 2. A signed webhook callback, verified and decoded by
//!    [`PaymentGateway::verify_and_decode`]
//!
//! # Raw body requirement
//!
//! Signatures are computed over the exact bytes the gateway sent. Webhook
//! handlers must pass the unparsed request body; a body that was parsed and
//! re-serialized will not verify.

use crate::error::{GatewayError, SignatureError};
use crate::types::{Booking, BookingId, Money};
use async_trait::async_trait;
use std::collections::HashMap;

/// Metadata key carrying the booking id on checkout sessions.
pub const BOOKING_ID_METADATA_KEY: &str = "bookingId";

/// Event kind: hosted checkout completed.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Event kind: payment intent succeeded.
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Request for a hosted checkout session covering one booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Booking being paid; carried in session metadata
    pub booking_id: BookingId,
    /// Line item label
    pub product_name: String,
    /// Amount due, in minor units
    pub amount: Money,
    /// Redirect after successful payment
    pub success_url: String,
    /// Redirect after abandoned payment
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Build the request for a booking: one line item named
    /// `"{hotel_name} - {room_type}"` priced at the booking total.
    #[must_use]
    pub fn for_booking(
        booking: &Booking,
        hotel_name: &str,
        room_type: &str,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            booking_id: booking.id,
            product_name: format!("{hotel_name} - {room_type}"),
            amount: booking.total_price,
            success_url,
            cancel_url,
        }
    }
}

/// A hosted checkout session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Gateway session id
    pub id: String,
    /// Hosted payment page (present on freshly created sessions)
    pub url: Option<String>,
    /// Payment intent created for the session, once known
    pub payment_intent: Option<String>,
    /// Session metadata
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Raw `bookingId` metadata value, if present and non-empty.
    #[must_use]
    pub fn booking_ref(&self) -> Option<&str> {
        self.metadata
            .get(BOOKING_ID_METADATA_KEY)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Decoded event payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// `checkout.session.completed`
    CheckoutSessionCompleted(CheckoutSession),
    /// `payment_intent.succeeded`
    PaymentIntentSucceeded {
        /// Payment intent id
        payment_intent: String,
    },
    /// Any other event type; acknowledged and ignored
    Other(String),
}

/// A verified webhook event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentEvent {
    /// Gateway event id
    pub id: String,
    /// Decoded payload
    pub kind: EventKind,
}

impl PaymentEvent {
    /// Gateway type string of this event.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match &self.kind {
            EventKind::CheckoutSessionCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            EventKind::PaymentIntentSucceeded { .. } => PAYMENT_INTENT_SUCCEEDED,
            EventKind::Other(kind) => kind,
        }
    }
}

/// Payment gateway adapter.
///
/// Constructed explicitly and injected; there is no process-wide client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Payment method recorded on bookings paid through this gateway.
    ///
    /// Defaults to `"gateway"`. `StripeGateway` overrides it, so bookings
    /// paid in production record `"Stripe"`.
    fn method_name(&self) -> &'static str {
        "gateway"
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the gateway rejects the request or is
    /// unreachable.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Checkout sessions associated with a payment intent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the lookup fails.
    async fn sessions_for_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<Vec<CheckoutSession>, GatewayError>;

    /// Verify a webhook signature over the raw request body and decode it.
    ///
    /// `payload` must be the exact bytes received.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] if the header is malformed, stale, does not
    /// match, or the verified payload is not an event.
    fn verify_and_decode(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, SignatureError>;
}
