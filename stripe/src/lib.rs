//! Stripe adapter for the QuickStay payment workflow.
//!
//! Implements [`quickstay_core::PaymentGateway`] against the Stripe REST API:
//!
//! - `POST /v1/checkout/sessions`: hosted checkout for one booking
//! - `GET /v1/checkout/sessions?payment_intent=...`: map a payment intent back
//!   to its session (and so to its booking)
//! - Webhook verification using the `Stripe-Signature` scheme (see
//!   [`webhook`])
//!
//! # Example
//!
//! ```ignore
//! use quickstay_stripe::{StripeConfig, StripeGateway};
//!
//! let gateway = StripeGateway::new(StripeConfig::new(secret_key, webhook_secret), clock)?;
//! let session = gateway.create_checkout_session(&request).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod webhook;

mod wire;

pub use client::{StripeConfig, StripeGateway};
pub use webhook::{construct_event, sign_header, SIGNATURE_HEADER};
