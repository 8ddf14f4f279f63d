//! Mock payment gateway.

use crate::mocks::{test_clock, FixedClock};
use async_trait::async_trait;
use quickstay_core::payment::BOOKING_ID_METADATA_KEY;
use quickstay_core::{
    CheckoutRequest, CheckoutSession, Clock, GatewayError, PaymentEvent, PaymentGateway,
    SignatureError,
};
use quickstay_stripe::webhook::DEFAULT_TOLERANCE_SECS;
use quickstay_stripe::{construct_event, sign_header};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Default signing secret of the mock.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_quickstay";

/// In-process [`PaymentGateway`].
///
/// Checkout sessions are recorded and answered with deterministic ids. Webhook
/// verification runs the real Stripe signature scheme against a fixed clock,
/// so tests sign deliveries with [`MockPaymentGateway::sign`].
pub struct MockPaymentGateway {
    webhook_secret: String,
    clock: FixedClock,
    checkouts: Mutex<Vec<CheckoutRequest>>,
    sessions_by_intent: Mutex<HashMap<String, Vec<CheckoutSession>>>,
    failing: AtomicBool,
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentGateway {
    /// Gateway signing with [`TEST_WEBHOOK_SECRET`] at [`test_clock`] time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            clock: test_clock(),
            checkouts: Mutex::new(Vec::new()),
            sessions_by_intent: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make gateway API calls fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Checkout requests received so far.
    pub async fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.checkouts.lock().await.clone()
    }

    /// Register the sessions returned for `payment_intent`.
    pub async fn register_intent(&self, payment_intent: &str, booking_ref: Option<&str>) {
        let mut metadata = HashMap::new();
        if let Some(booking_ref) = booking_ref {
            metadata.insert(BOOKING_ID_METADATA_KEY.to_string(), booking_ref.to_string());
        }
        let session = CheckoutSession {
            id: format!("cs_for_{payment_intent}"),
            url: None,
            payment_intent: Some(payment_intent.to_string()),
            metadata,
        };
        self.sessions_by_intent
            .lock()
            .await
            .entry(payment_intent.to_string())
            .or_default()
            .push(session);
    }

    /// `Stripe-Signature` header for `payload`, signed now with the mock's secret.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        self.sign_with(payload, &self.webhook_secret)
    }

    /// `Stripe-Signature` header for `payload` signed with an arbitrary secret.
    #[must_use]
    pub fn sign_with(&self, payload: &[u8], secret: &str) -> String {
        sign_header(payload, secret, self.clock.now().timestamp()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(GatewayError::RequestFailed("mock gateway set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.check_available()?;

        let mut checkouts = self.checkouts.lock().await;
        checkouts.push(request.clone());
        let id = format!("cs_test_{}", checkouts.len());

        Ok(CheckoutSession {
            url: Some(format!("https://checkout.test/pay/{id}")),
            id,
            payment_intent: None,
            metadata: HashMap::from([(
                BOOKING_ID_METADATA_KEY.to_string(),
                request.booking_id.to_string(),
            )]),
        })
    }

    async fn sessions_for_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<Vec<CheckoutSession>, GatewayError> {
        self.check_available()?;
        Ok(self
            .sessions_by_intent
            .lock()
            .await
            .get(payment_intent)
            .cloned()
            .unwrap_or_default())
    }

    fn verify_and_decode(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, SignatureError> {
        construct_event(
            payload,
            signature_header,
            &self.webhook_secret,
            self.clock.now(),
            DEFAULT_TOLERANCE_SECS,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::other_event_payload;
    use quickstay_core::{BookingId, EventKind, Money};

    #[tokio::test]
    async fn test_checkout_sessions_are_recorded() {
        let gateway = MockPaymentGateway::new();
        let request = CheckoutRequest {
            booking_id: BookingId::new(),
            product_name: "Hotel - Room".to_string(),
            amount: Money::from_cents(100),
            success_url: "https://a/loader/my-bookings".to_string(),
            cancel_url: "https://a/my-bookings".to_string(),
        };

        let session = gateway.create_checkout_session(&request).await.unwrap();

        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.booking_ref(), Some(request.booking_id.to_string().as_str()));
        assert_eq!(gateway.checkouts().await, vec![request]);
    }

    #[test]
    fn test_signed_payload_verifies() {
        let gateway = MockPaymentGateway::new();
        let payload = other_event_payload("evt_1", "charge.refunded");

        let event = gateway.verify_and_decode(&payload, &gateway.sign(&payload)).unwrap();
        assert_eq!(event.kind, EventKind::Other("charge.refunded".to_string()));

        let forged = gateway.sign_with(&payload, "whsec_other");
        assert!(gateway.verify_and_decode(&payload, &forged).is_err());
    }
}
