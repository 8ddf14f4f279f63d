//! HTTP-level tests for `StripeGateway` against a wiremock Stripe.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use chrono::{DateTime, Utc};
use quickstay_core::{BookingId, CheckoutRequest, Clock, GatewayError, Money, PaymentGateway};
use quickstay_stripe::{sign_header, StripeConfig, StripeGateway};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StoppedClock(DateTime<Utc>);

impl Clock for StoppedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn signed_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap()
}

fn gateway(server: &MockServer) -> StripeGateway {
    let mut config = StripeConfig::new("sk_test_123", "whsec_abc");
    config.api_base = server.uri();
    StripeGateway::new(config, Arc::new(StoppedClock(signed_at()))).unwrap()
}

fn checkout_request(booking_id: BookingId) -> CheckoutRequest {
    CheckoutRequest {
        booking_id,
        product_name: "Urbanza Suites - Double Bed".to_string(),
        amount: Money::from_cents(30_000),
        success_url: "https://app.example.com/loader/my-bookings".to_string(),
        cancel_url: "https://app.example.com/my-bookings".to_string(),
    }
}

#[tokio::test]
async fn test_create_checkout_session_sends_one_line_item_in_cents() {
    let server = MockServer::start().await;
    let booking_id = BookingId::new();

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=1"))
        .and(body_string_contains("line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=30000"))
        .and(body_string_contains(format!("metadata%5BbookingId%5D={booking_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_1",
            "url": "https://checkout.stripe.com/c/pay/cs_test_1",
            "payment_intent": null,
            "metadata": { "bookingId": booking_id.to_string() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = gateway(&server)
        .create_checkout_session(&checkout_request(booking_id))
        .await
        .unwrap();

    assert_eq!(session.id, "cs_test_1");
    assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.com/c/pay/cs_test_1"));
    assert_eq!(session.booking_ref(), Some(booking_id.to_string().as_str()));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid integer: -1", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .create_checkout_session(&checkout_request(BookingId::new()))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Api {
            status: 400,
            message: "Invalid integer: -1".to_string()
        }
    );
}

#[tokio::test]
async fn test_sessions_for_payment_intent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions"))
        .and(query_param("payment_intent", "pi_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "id": "cs_1", "payment_intent": "pi_123", "metadata": { "bookingId": "b-1" } },
                { "id": "cs_2", "payment_intent": { "id": "pi_123" }, "metadata": null }
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let sessions = gateway(&server).sessions_for_payment_intent("pi_123").await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].booking_ref(), Some("b-1"));
    assert_eq!(sessions[1].payment_intent.as_deref(), Some("pi_123"));
    assert_eq!(sessions[1].booking_ref(), None);
}

#[tokio::test]
async fn test_verify_and_decode_uses_webhook_secret_and_clock() {
    let server = MockServer::start().await;
    let gateway = gateway(&server);
    let payload = br#"{"id":"evt_1","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;

    let good = sign_header(payload, "whsec_abc", signed_at().timestamp()).unwrap();
    assert!(gateway.verify_and_decode(payload, &good).is_ok());

    let signed_with_api_key = sign_header(payload, "sk_test_123", signed_at().timestamp()).unwrap();
    assert!(gateway.verify_and_decode(payload, &signed_with_api_key).is_err());
}

#[tokio::test]
async fn test_paid_bookings_record_stripe_as_method() {
    let server = MockServer::start().await;
    assert_eq!(gateway(&server).method_name(), "Stripe");
}
