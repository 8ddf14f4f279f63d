//! Webhook reconciliation tests.
//!
//! Deliveries are signed with the mock gateway's secret and verified by the
//! real Stripe signature scheme.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use quickstay::services::{ReconcileOutcome, UnmappedReason, WebhookReconciler};
use quickstay_core::{Booking, PaymentStatus, RoomId, SignatureError, WebhookError};
use quickstay_testing::fixtures::{
    checkout_completed_payload, date, other_event_payload, payment_intent_succeeded_payload,
    unpaid_booking,
};
use quickstay_testing::{InMemoryBookingStore, MockPaymentGateway};
use std::sync::Arc;

struct Setup {
    reconciler: WebhookReconciler,
    store: Arc<InMemoryBookingStore>,
    gateway: Arc<MockPaymentGateway>,
    booking: Booking,
}

async fn setup(ack_unknown_bookings: bool) -> Setup {
    let store = Arc::new(InMemoryBookingStore::new());
    let gateway = Arc::new(MockPaymentGateway::new());
    let booking = unpaid_booking(RoomId::new(), date(2024, 1, 1), date(2024, 1, 4));
    store.seed(booking.clone()).await;

    Setup {
        reconciler: WebhookReconciler::new(store.clone(), gateway.clone(), ack_unknown_bookings),
        store,
        gateway,
        booking,
    }
}

impl Setup {
    async fn deliver(&self, payload: &[u8]) -> Result<ReconcileOutcome, WebhookError> {
        self.reconciler.handle(payload, &self.gateway.sign(payload)).await
    }

    async fn status(&self) -> PaymentStatus {
        self.store.all().await[0].payment_status
    }
}

#[tokio::test]
async fn test_checkout_completed_is_idempotent() {
    let s = setup(true).await;
    let payload = checkout_completed_payload("evt_1", Some(&s.booking.id.to_string()));

    assert_eq!(s.deliver(&payload).await.unwrap(), ReconcileOutcome::Applied(s.booking.id));
    assert_eq!(s.status().await, PaymentStatus::Paid);
    assert_eq!(s.store.write_count(), 1);

    // Redelivery of the same event
    assert_eq!(s.deliver(&payload).await.unwrap(), ReconcileOutcome::AlreadyPaid(s.booking.id));
    assert_eq!(s.store.write_count(), 1);
}

#[tokio::test]
async fn test_forged_deliveries_never_mutate() {
    let s = setup(true).await;
    let payload = checkout_completed_payload("evt_1", Some(&s.booking.id.to_string()));

    let wrong_secret = s.gateway.sign_with(&payload, "whsec_attacker");
    let result = s.reconciler.handle(&payload, &wrong_secret).await;
    assert!(matches!(result, Err(WebhookError::Signature(_))));

    // Signed body, tampered in transit
    let signature = s.gateway.sign(&payload);
    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");
    assert!(matches!(
        s.reconciler.handle(&tampered, &signature).await,
        Err(WebhookError::Signature(_))
    ));

    assert!(matches!(
        s.reconciler.handle(&payload, "garbage").await,
        Err(WebhookError::Signature(_))
    ));

    assert_eq!(s.status().await, PaymentStatus::Unpaid);
    assert_eq!(s.store.write_count(), 0);
}

#[tokio::test]
async fn test_signed_garbage_is_undecodable() {
    let s = setup(true).await;
    let payload = b"not json".to_vec();

    assert!(matches!(
        s.deliver(&payload).await,
        Err(WebhookError::Signature(SignatureError::UndecodablePayload(_)))
    ));
}

#[tokio::test]
async fn test_unhandled_event_types_are_acknowledged() {
    let s = setup(true).await;
    let payload = other_event_payload("evt_9", "charge.refunded");

    assert_eq!(
        s.deliver(&payload).await.unwrap(),
        ReconcileOutcome::Ignored {
            kind: "charge.refunded".to_string()
        }
    );
    assert_eq!(s.store.write_count(), 0);
}

#[tokio::test]
async fn test_payment_intent_without_session_is_unmapped() {
    let s = setup(true).await;
    let payload = payment_intent_succeeded_payload("evt_2", "pi_orphan");

    assert_eq!(
        s.deliver(&payload).await.unwrap(),
        ReconcileOutcome::Unmapped {
            reason: UnmappedReason::NoSession {
                payment_intent: "pi_orphan".to_string()
            }
        }
    );
    assert_eq!(s.store.write_count(), 0);
}

#[tokio::test]
async fn test_payment_intent_resolves_booking_through_session() {
    let s = setup(true).await;
    s.gateway.register_intent("pi_42", Some(&s.booking.id.to_string())).await;
    let payload = payment_intent_succeeded_payload("evt_3", "pi_42");

    assert_eq!(s.deliver(&payload).await.unwrap(), ReconcileOutcome::Applied(s.booking.id));
    assert_eq!(s.status().await, PaymentStatus::Paid);

    // checkout.session.completed for the same payment arrives afterwards
    let completed = checkout_completed_payload("evt_4", Some(&s.booking.id.to_string()));
    assert_eq!(s.deliver(&completed).await.unwrap(), ReconcileOutcome::AlreadyPaid(s.booking.id));
    assert_eq!(s.store.write_count(), 1);
}

#[tokio::test]
async fn test_payment_intent_session_without_metadata_is_unmapped() {
    let s = setup(true).await;
    s.gateway.register_intent("pi_7", None).await;

    let outcome = s.deliver(&payment_intent_succeeded_payload("evt_5", "pi_7")).await.unwrap();
    assert!(matches!(
        outcome,
        ReconcileOutcome::Unmapped {
            reason: UnmappedReason::NoMetadata { .. }
        }
    ));
    assert_eq!(s.store.write_count(), 0);
}

#[tokio::test]
async fn test_completed_checkout_without_booking_id_is_rejected() {
    let s = setup(true).await;
    let payload = checkout_completed_payload("evt_6", None);

    assert!(matches!(
        s.deliver(&payload).await,
        Err(WebhookError::MetadataMissing { event_id }) if event_id == "evt_6"
    ));
    assert_eq!(s.store.write_count(), 0);
}

#[tokio::test]
async fn test_unknown_booking_policy() {
    let unknown = quickstay_core::BookingId::new().to_string();
    let payload = checkout_completed_payload("evt_7", Some(&unknown));

    let acking = setup(true).await;
    assert_eq!(
        acking.deliver(&payload).await.unwrap(),
        ReconcileOutcome::Unmapped {
            reason: UnmappedReason::UnknownBooking(unknown.clone())
        }
    );

    let strict = setup(false).await;
    assert!(matches!(
        strict.deliver(&payload).await,
        Err(WebhookError::BookingNotFound(id)) if id == unknown
    ));

    // Not a booking id at all
    let malformed = checkout_completed_payload("evt_8", Some("not-a-uuid"));
    assert!(matches!(
        acking.deliver(&malformed).await.unwrap(),
        ReconcileOutcome::Unmapped {
            reason: UnmappedReason::UnknownBooking(_)
        }
    ));
}

#[tokio::test]
async fn test_cancelled_booking_is_not_paid() {
    let store = Arc::new(InMemoryBookingStore::new());
    let gateway = Arc::new(MockPaymentGateway::new());
    let mut booking = unpaid_booking(RoomId::new(), date(2024, 1, 1), date(2024, 1, 2));
    booking.payment_status = PaymentStatus::Cancelled;
    store.seed(booking.clone()).await;
    let reconciler = WebhookReconciler::new(store.clone(), gateway.clone(), true);

    let payload = checkout_completed_payload("evt_c", Some(&booking.id.to_string()));
    let outcome = reconciler.handle(&payload, &gateway.sign(&payload)).await.unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Unmapped {
            reason: UnmappedReason::BookingCancelled(booking.id)
        }
    );
    assert_eq!(store.all().await[0].payment_status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn test_transient_failures_are_not_acknowledged() {
    let s = setup(true).await;

    s.store.set_failing(true);
    let payload = checkout_completed_payload("evt_10", Some(&s.booking.id.to_string()));
    assert!(matches!(s.deliver(&payload).await, Err(WebhookError::Storage(_))));
    s.store.set_failing(false);

    s.gateway.set_failing(true);
    let intent = payment_intent_succeeded_payload("evt_11", "pi_1");
    assert!(matches!(s.deliver(&intent).await, Err(WebhookError::Gateway(_))));
    s.gateway.set_failing(false);

    // The retried delivery still applies
    assert_eq!(s.deliver(&payload).await.unwrap(), ReconcileOutcome::Applied(s.booking.id));
}
