//! Stripe JSON shapes, limited to the fields the workflow reads.

use quickstay_core::CheckoutSession;
use serde::Deserialize;
use std::collections::HashMap;

/// Webhook event envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WireEventData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEventData {
    pub object: serde_json::Value,
}

/// Checkout session object.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Either an id string or, when expanded, a payment intent object
    #[serde(default)]
    pub payment_intent: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl From<WireSession> for CheckoutSession {
    fn from(wire: WireSession) -> Self {
        let payment_intent = wire.payment_intent.and_then(|value| match value {
            serde_json::Value::String(id) => Some(id),
            serde_json::Value::Object(object) => object
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            _ => None,
        });

        Self {
            id: wire.id,
            url: wire.url,
            payment_intent,
            metadata: wire.metadata.unwrap_or_default(),
        }
    }
}

/// Payment intent object (only its id is needed).
#[derive(Debug, Deserialize)]
pub(crate) struct WirePaymentIntent {
    pub id: String,
}

/// `GET /v1/checkout/sessions` response.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSessionList {
    pub data: Vec<WireSession>,
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorBody {
    pub error: WireError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    #[serde(default)]
    pub message: Option<String>,
}
