//! Webhook reconciliation: gateway events → booking payment status.
//!
//! Every delivery is verified against the raw body before anything else.
//! Verified events are acknowledged unless acknowledging would lose
//! information the gateway can still deliver (storage failures, and unknown
//! bookings when so configured).

use quickstay_core::{
    BookingId, BookingStore, EventKind, PaymentEvent, PaymentGateway, PaymentStatus,
    PaymentUpdate, WebhookError,
};
use std::fmt;
use std::sync::Arc;

/// Why a verified event could not be tied to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmappedReason {
    /// No checkout session exists for the payment intent
    NoSession {
        /// Payment intent id
        payment_intent: String,
    },
    /// The session carries no `bookingId` metadata
    NoMetadata {
        /// Checkout session id
        session_id: String,
    },
    /// `bookingId` names no booking
    UnknownBooking(String),
    /// The booking is cancelled and cannot be paid
    BookingCancelled(BookingId),
}

impl fmt::Display for UnmappedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession { payment_intent } => {
                write!(f, "no checkout session for payment intent {payment_intent}")
            },
            Self::NoMetadata { session_id } => write!(f, "session {session_id} has no bookingId"),
            Self::UnknownBooking(id) => write!(f, "booking {id} not found"),
            Self::BookingCancelled(id) => write!(f, "booking {id} is cancelled"),
        }
    }
}

/// What handling a verified event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The booking flipped `unpaid → paid`
    Applied(BookingId),
    /// The booking was already paid; nothing written
    AlreadyPaid(BookingId),
    /// Event kind not handled; nothing written
    Ignored {
        /// Gateway event type
        kind: String,
    },
    /// Event could not be tied to a payable booking; nothing written
    Unmapped {
        /// Why
        reason: UnmappedReason,
    },
}

/// Applies verified payment events to bookings.
#[derive(Clone)]
pub struct WebhookReconciler {
    store: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    ack_unknown_bookings: bool,
}

impl WebhookReconciler {
    /// Create a reconciler.
    ///
    /// With `ack_unknown_bookings` an event naming a nonexistent booking is
    /// acknowledged and logged; without it the event is rejected so the
    /// gateway redelivers.
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        ack_unknown_bookings: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            ack_unknown_bookings,
        }
    }

    /// Verify a raw delivery and apply it.
    ///
    /// `payload` must be the unparsed request body.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::Signature`] if verification or decoding fails
    /// - [`WebhookError::MetadataMissing`] for a completed checkout without `bookingId`
    /// - [`WebhookError::BookingNotFound`] for unknown bookings when not acknowledged
    /// - [`WebhookError::Storage`] / [`WebhookError::Gateway`] for transient failures
    pub async fn handle(&self, payload: &[u8], signature_header: &str) -> Result<ReconcileOutcome, WebhookError> {
        let event = self.gateway.verify_and_decode(payload, signature_header).map_err(|e| {
            metrics::counter!("quickstay_webhook_events_total", "outcome" => "rejected").increment(1);
            tracing::warn!(error = %e, "Webhook signature rejected");
            e
        })?;

        let outcome = self.dispatch(event).await?;
        metrics::counter!("quickstay_webhook_events_total", "outcome" => outcome_label(&outcome)).increment(1);
        Ok(outcome)
    }

    /// Apply an already verified event.
    ///
    /// # Errors
    ///
    /// As [`WebhookReconciler::handle`], minus signature failures.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, kind = %event.type_name()))]
    pub async fn dispatch(&self, event: PaymentEvent) -> Result<ReconcileOutcome, WebhookError> {
        match event.kind {
            EventKind::CheckoutSessionCompleted(session) => {
                let Some(booking_ref) = session.booking_ref() else {
                    tracing::warn!(session_id = %session.id, "Completed checkout has no bookingId");
                    return Err(WebhookError::MetadataMissing { event_id: event.id });
                };
                self.mark_paid(booking_ref).await
            },
            EventKind::PaymentIntentSucceeded { payment_intent } => {
                let sessions = self.gateway.sessions_for_payment_intent(&payment_intent).await?;
                let Some(session) = sessions.first() else {
                    return Ok(unmapped(UnmappedReason::NoSession { payment_intent }));
                };
                let Some(booking_ref) = session.booking_ref() else {
                    return Ok(unmapped(UnmappedReason::NoMetadata {
                        session_id: session.id.clone(),
                    }));
                };
                self.mark_paid(booking_ref).await
            },
            EventKind::Other(kind) => {
                tracing::debug!(%kind, "Unhandled event type acknowledged");
                Ok(ReconcileOutcome::Ignored { kind })
            },
        }
    }

    async fn mark_paid(&self, booking_ref: &str) -> Result<ReconcileOutcome, WebhookError> {
        let Ok(booking_id) = booking_ref.parse::<BookingId>() else {
            return self.unknown_booking(booking_ref);
        };

        match self.store.mark_paid(booking_id, self.gateway.method_name()).await? {
            PaymentUpdate::Applied(booking) => {
                tracing::info!(booking_id = %booking.id, total = %booking.total_price, "Booking marked paid");
                Ok(ReconcileOutcome::Applied(booking.id))
            },
            PaymentUpdate::Unchanged(booking) if booking.payment_status == PaymentStatus::Cancelled => {
                Ok(unmapped(UnmappedReason::BookingCancelled(booking.id)))
            },
            PaymentUpdate::Unchanged(booking) => {
                tracing::debug!(booking_id = %booking.id, "Booking already paid; redelivery ignored");
                Ok(ReconcileOutcome::AlreadyPaid(booking.id))
            },
            PaymentUpdate::Missing => self.unknown_booking(booking_ref),
        }
    }

    fn unknown_booking(&self, booking_ref: &str) -> Result<ReconcileOutcome, WebhookError> {
        if self.ack_unknown_bookings {
            Ok(unmapped(UnmappedReason::UnknownBooking(booking_ref.to_string())))
        } else {
            tracing::warn!(booking_ref, "Webhook names unknown booking; rejecting for redelivery");
            Err(WebhookError::BookingNotFound(booking_ref.to_string()))
        }
    }
}

fn unmapped(reason: UnmappedReason) -> ReconcileOutcome {
    tracing::warn!(%reason, "Verified event not applied");
    ReconcileOutcome::Unmapped { reason }
}

const fn outcome_label(outcome: &ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::Applied(_) => "applied",
        ReconcileOutcome::AlreadyPaid(_) => "already_paid",
        ReconcileOutcome::Ignored { .. } => "ignored",
        ReconcileOutcome::Unmapped { .. } => "unmapped",
    }
}
