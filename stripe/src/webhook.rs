//! Stripe webhook signature verification.
//!
//! Stripe signs each delivery with the endpoint's signing secret (`whsec_...`):
//!
//! ```text
//! Stripe-Signature: t=1704067200,v1=5257a869e7...,v1=...
//! expected = hex(HMAC-SHA256(secret, "{t}.{raw body}"))
//! ```
//!
//! The payload is verified exactly as received. Pass the raw request bytes;
//! a parsed-then-reserialized JSON body changes whitespace and key order and
//! will not verify.
//!
//! Verification uses the webhook signing secret, never the API secret key.

use crate::wire::{WireEvent, WirePaymentIntent, WireSession};
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use quickstay_core::payment::{CHECKOUT_SESSION_COMPLETED, PAYMENT_INTENT_SUCCEEDED};
use quickstay_core::{EventKind, PaymentEvent, SignatureError};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Default replay window, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed `Stripe-Signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::MalformedHeader),
    }
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Produce a `Stripe-Signature` header value for `payload`.
///
/// Used by test gateways and local tooling to emit deliveries that verify the
/// same way real ones do.
///
/// # Errors
///
/// Returns [`SignatureError::Mismatch`] if the secret cannot key an HMAC.
pub fn sign_header(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},v1={signature}"))
}

/// Verify the signature header against the raw payload.
///
/// # Errors
///
/// - [`SignatureError::MalformedHeader`] if the header lacks `t` or `v1`
/// - [`SignatureError::TimestampOutOfTolerance`] if `t` is further than
///   `tolerance_secs` from `now`
/// - [`SignatureError::Mismatch`] if no `v1` signature matches
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    // `t` is untrusted; any value must compare without overflow
    let skew = now.timestamp().abs_diff(parsed.timestamp);
    if skew > u64::try_from(tolerance_secs).unwrap_or(0) {
        let age_secs = now.timestamp().checked_sub(parsed.timestamp).unwrap_or(i64::MAX);
        return Err(SignatureError::TimestampOutOfTolerance { age_secs });
    }

    let expected = compute_signature(secret, parsed.timestamp, payload)?;
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| constant_time_eq(expected.as_bytes(), candidate.as_bytes()));

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Decode a verified payload into a [`PaymentEvent`].
fn decode_event(payload: &[u8]) -> Result<PaymentEvent, SignatureError> {
    let event: WireEvent = serde_json::from_slice(payload)
        .map_err(|e| SignatureError::UndecodablePayload(e.to_string()))?;

    let kind = match event.kind.as_str() {
        CHECKOUT_SESSION_COMPLETED => {
            let session: WireSession = serde_json::from_value(event.data.object)
                .map_err(|e| SignatureError::UndecodablePayload(format!("checkout session: {e}")))?;
            EventKind::CheckoutSessionCompleted(session.into())
        },
        PAYMENT_INTENT_SUCCEEDED => {
            let intent: WirePaymentIntent = serde_json::from_value(event.data.object)
                .map_err(|e| SignatureError::UndecodablePayload(format!("payment intent: {e}")))?;
            EventKind::PaymentIntentSucceeded {
                payment_intent: intent.id,
            }
        },
        _ => EventKind::Other(event.kind),
    };

    Ok(PaymentEvent { id: event.id, kind })
}

/// Verify and decode a webhook delivery.
///
/// # Errors
///
/// Any [`SignatureError`] from [`verify_signature`], or
/// [`SignatureError::UndecodablePayload`] if the verified body is not a
/// Stripe event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
    tolerance_secs: i64,
) -> Result<PaymentEvent, SignatureError> {
    verify_signature(payload, header, secret, now, tolerance_secs)?;
    decode_event(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200, 0).unwrap()
    }

    fn completed_payload(booking_id: &str) -> Vec<u8> {
        format!(
            r#"{{"id":"evt_1","type":"checkout.session.completed","data":{{"object":{{"id":"cs_1","payment_intent":"pi_1","metadata":{{"bookingId":"{booking_id}"}}}}}}}}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_valid_signature_decodes_checkout_event() {
        let payload = completed_payload("b-42");
        let header = sign_header(&payload, SECRET, now().timestamp()).unwrap();

        let event = construct_event(&payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS).unwrap();

        assert_eq!(event.id, "evt_1");
        let EventKind::CheckoutSessionCompleted(session) = event.kind else {
            panic!("expected checkout event");
        };
        assert_eq!(session.booking_ref(), Some("b-42"));
        assert_eq!(session.payment_intent.as_deref(), Some("pi_1"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let payload = completed_payload("b-42");
        let header = sign_header(&payload, "sk_live_not_the_webhook_secret", now().timestamp()).unwrap();

        assert_eq!(
            construct_event(&payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_reserialized_body_is_rejected() {
        let payload = completed_payload("b-42");
        let header = sign_header(&payload, SECRET, now().timestamp()).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        let reserialized = serde_json::to_vec_pretty(&parsed).unwrap();

        assert_eq!(
            verify_signature(&reserialized, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let payload = completed_payload("b-42");
        let signed_at = now().timestamp() - DEFAULT_TOLERANCE_SECS - 1;
        let header = sign_header(&payload, SECRET, signed_at).unwrap();

        assert!(matches!(
            construct_event(&payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::TimestampOutOfTolerance { .. })
        ));
    }

    #[test]
    fn test_extreme_timestamps_are_rejected() {
        let payload = completed_payload("b-42");
        for timestamp in [i64::MIN, i64::MAX] {
            let header = format!("t={timestamp},v1=00");
            assert!(matches!(
                verify_signature(&payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
                Err(SignatureError::TimestampOutOfTolerance { .. })
            ));
        }
    }

    #[test]
    fn test_any_matching_v1_is_accepted() {
        let payload = completed_payload("b-42");
        let valid = sign_header(&payload, SECRET, now().timestamp()).unwrap();
        let signature = valid.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1=deadbeef,v0=ignored,v1={signature}", now().timestamp());

        assert!(verify_signature(&payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS).is_ok());
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "garbage", "t=abc,v1=00", "t=1704067200", "v1=00"] {
            assert_eq!(
                verify_signature(b"{}", header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
                Err(SignatureError::MalformedHeader),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_unknown_event_kind_decodes_as_other() {
        let payload = br#"{"id":"evt_2","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
        let header = sign_header(payload, SECRET, now().timestamp()).unwrap();

        let event = construct_event(payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS).unwrap();
        assert_eq!(event.kind, EventKind::Other("customer.created".to_string()));
    }

    #[test]
    fn test_payment_intent_event_decodes_intent_id() {
        let payload = br#"{"id":"evt_3","type":"payment_intent.succeeded","data":{"object":{"id":"pi_9","amount":30000}}}"#;
        let header = sign_header(payload, SECRET, now().timestamp()).unwrap();

        let event = construct_event(payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS).unwrap();
        assert_eq!(
            event.kind,
            EventKind::PaymentIntentSucceeded { payment_intent: "pi_9".to_string() }
        );
    }

    #[test]
    fn test_signed_garbage_is_undecodable() {
        let payload = b"not json";
        let header = sign_header(payload, SECRET, now().timestamp()).unwrap();

        assert!(matches!(
            construct_event(payload, &header, SECRET, now(), DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::UndecodablePayload(_))
        ));
    }
}
