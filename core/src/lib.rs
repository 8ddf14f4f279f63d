//! # QuickStay Core
//!
//! Domain types, errors and dependency traits for the QuickStay
//! booking-and-payment workflow.
//!
//! The crate is deliberately free of I/O. Everything that touches the outside
//! world (the booking database, the room catalog, the payment gateway, the
//! confirmation mailer, the clock) is described by a trait in [`environment`]
//! or [`payment`] and injected by the application.
//!
//! ## Core Concepts
//!
//! - **Booking**: a reservation of a room for a date range, with a price and a
//!   payment status (`unpaid` → `paid`)
//! - **Availability**: absence of any overlapping, non-cancelled booking for a
//!   room (see [`availability`])
//! - **Pricing**: `price_per_night × nights`, in integer minor units (see
//!   [`pricing`])
//! - **Payment events**: verified gateway webhooks decoded into
//!   [`payment::PaymentEvent`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │  BookingService  │   │ WebhookReconciler│   │   HTTP handlers  │
//! └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │                      │                      │
//!          └──────────────┬───────┴──────────────────────┘
//!                         ▼
//!      BookingStore · RoomCatalog · PaymentGateway · Notifier · Clock
//!                  (traits defined here, implemented elsewhere)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod availability;
pub mod environment;
pub mod error;
pub mod payment;
pub mod pricing;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};

pub use environment::{BookingNotice, BookingStore, Clock, Notifier, PaymentUpdate, RoomCatalog, SystemClock};
pub use error::{BookingError, GatewayError, NotifyError, SignatureError, StoreError, WebhookError};
pub use payment::{CheckoutRequest, CheckoutSession, EventKind, PaymentEvent, PaymentGateway};
pub use types::{Booking, BookingId, Hotel, HotelId, Money, PaymentStatus, Room, RoomId, RoomListing, UserId};
