//! Stripe REST client implementing [`PaymentGateway`].

use crate::webhook::{self, DEFAULT_TOLERANCE_SECS};
use crate::wire::{WireErrorBody, WireSession, WireSessionList};
use async_trait::async_trait;
use quickstay_core::payment::BOOKING_ID_METADATA_KEY;
use quickstay_core::{
    CheckoutRequest, CheckoutSession, Clock, GatewayError, PaymentEvent, PaymentGateway,
    SignatureError,
};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

/// Stripe adapter configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key (`sk_...`), used for REST calls only
    pub secret_key: String,
    /// Webhook signing secret (`whsec_...`), used for signature verification only
    pub webhook_secret: String,
    /// API base URL
    pub api_base: String,
    /// ISO currency code for line items
    pub currency: String,
    /// Accepted distance between a webhook's signed timestamp and now
    pub webhook_tolerance_secs: i64,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl StripeConfig {
    /// Configuration with Stripe's production API and USD pricing.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            request_timeout: Duration::from_secs(15),
        }
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Stripe payment gateway.
#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    config: StripeConfig,
    clock: Arc<dyn Clock>,
}

impl StripeGateway {
    /// Create a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new(config: StripeConfig, clock: Arc<dyn Clock>) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config, clock })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    fn checkout_form(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount.cents().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            (
                format!("metadata[{BOOKING_ID_METADATA_KEY}]"),
                request.booking_id.to_string(),
            ),
        ]
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayError::ResponseParseFailed(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<WireErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error.message)
            .unwrap_or(body);

        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn method_name(&self) -> &'static str {
        "Stripe"
    }

    #[tracing::instrument(skip(self, request), fields(booking_id = %request.booking_id))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .http
            .post(self.url("/v1/checkout/sessions"))
            .bearer_auth(&self.config.secret_key)
            .form(&self.checkout_form(request))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let session: CheckoutSession = Self::read_json::<WireSession>(response).await?.into();

        tracing::info!(
            session_id = %session.id,
            amount = request.amount.cents(),
            "Stripe checkout session created"
        );

        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    async fn sessions_for_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<Vec<CheckoutSession>, GatewayError> {
        let response = self
            .http
            .get(self.url("/v1/checkout/sessions"))
            .bearer_auth(&self.config.secret_key)
            .query(&[("payment_intent", payment_intent)])
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let list = Self::read_json::<WireSessionList>(response).await?;

        tracing::debug!(count = list.data.len(), "Stripe sessions listed");

        Ok(list.data.into_iter().map(CheckoutSession::from).collect())
    }

    fn verify_and_decode(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, SignatureError> {
        webhook::construct_event(
            payload,
            signature_header,
            &self.config.webhook_secret,
            self.clock.now(),
            self.config.webhook_tolerance_secs,
        )
    }
}
