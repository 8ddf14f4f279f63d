//! Error types for the booking workflow.
//!
//! - [`StoreError`]: persistence failures (including the overlap constraint)
//! - [`GatewayError`]: payment gateway API failures
//! - [`SignatureError`]: webhook signature verification failures
//! - [`NotifyError`]: confirmation delivery failures (always swallowed)
//! - [`BookingError`]: booking service failures surfaced to callers
//! - [`WebhookError`]: webhook reconciliation failures

use crate::types::{BookingId, RoomId};
use thiserror::Error;

/// Errors from a booking store or room catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The insert would overlap an existing non-cancelled booking of the room.
    ///
    /// Raised by the store itself, atomically with the write, so that two
    /// concurrent bookings can never both succeed.
    #[error("Booking overlaps an existing booking of room {room_id}")]
    Overlap {
        /// Contested room
        room_id: RoomId,
    },

    /// Backend failure (connection, query, row decoding). Transient.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors from the payment gateway API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// HTTP request failed before a response arrived
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    /// Gateway answered with an error status
    #[error("Gateway API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the gateway
        message: String,
    },

    /// Gateway response could not be parsed
    #[error("Gateway response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Created session carries no hosted checkout URL
    #[error("Gateway returned no checkout URL for session {0}")]
    MissingCheckoutUrl(String),
}

/// Webhook signature verification failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature header absent or without a timestamp / `v1` signature
    #[error("Malformed signature header")]
    MalformedHeader,

    /// Timestamp outside the accepted tolerance window (replay protection)
    #[error("Signature timestamp outside tolerance ({age_secs}s old)")]
    TimestampOutOfTolerance {
        /// Distance between the signed timestamp and now, in seconds
        age_secs: i64,
    },

    /// No `v1` signature matches the payload
    #[error("No signature matches the payload")]
    Mismatch,

    /// Payload verified but is not a decodable event
    #[error("Verified payload is not a valid event: {0}")]
    UndecodablePayload(String),
}

/// Confirmation delivery failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Recipient or sender address rejected
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transport failure
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Booking service failures.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Another non-cancelled booking overlaps the requested stay
    #[error("Room is not available")]
    RoomUnavailable,

    /// Room, hotel or booking does not exist
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource ("Room", "Booking", "Hotel")
        resource: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Stay shorter than one night
    #[error("Check-out date must be after check-in date")]
    InvalidDateRange,

    /// Zero guests
    #[error("A booking needs at least one guest")]
    InvalidGuestCount,

    /// Non-positive (or overflowing) total price
    #[error("Invalid booking amount")]
    InvalidAmount,

    /// Payment requested for a booking that is already paid
    #[error("Booking {0} is already paid")]
    AlreadyPaid(BookingId),

    /// Storage failure (transient, retryable upstream)
    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// Payment gateway failure
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl BookingError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Overlap { .. } => Self::RoomUnavailable,
            other => Self::Storage(other),
        }
    }
}

/// Webhook reconciliation failures.
///
/// [`WebhookError::is_verified`] separates failures on unverified input (the
/// gateway should investigate or retry) from failures on verified events.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signature verification failed; the event was not trusted
    #[error("Webhook signature verification failed: {0}")]
    Signature(#[from] SignatureError),

    /// `checkout.session.completed` without a `bookingId` in its metadata
    #[error("No bookingId found in metadata of event {event_id}")]
    MetadataMissing {
        /// Gateway event id
        event_id: String,
    },

    /// The mapped booking does not exist
    #[error("Booking {0} not found")]
    BookingNotFound(String),

    /// Storage failure while applying the event (gateway will redeliver)
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Gateway lookup failure while mapping the event (gateway will redeliver)
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl WebhookError {
    /// Whether the failing event passed signature verification.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        !matches!(self, Self::Signature(_))
    }
}
