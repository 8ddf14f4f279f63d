//! # QuickStay
//!
//! Hotel booking service: availability checks, unpaid booking creation,
//! hosted checkout sessions, and webhook reconciliation that flips bookings
//! to `paid` exactly once.
//!
//! ## Layout
//!
//! - [`services`]: the booking workflow, independent of HTTP
//! - [`api`]: axum handlers for the JSON endpoints
//! - [`server`]: application state, router and health checks
//! - [`notify`]: booking confirmation delivery (SMTP or console)
//! - [`config`]: environment configuration
//! - [`metrics`]: Prometheus recorder and counter descriptions
//!
//! ## Wiring
//!
//! ```ignore
//! let store = Arc::new(PostgresBookingStore::new(pool.clone()));
//! let catalog = Arc::new(PostgresRoomCatalog::new(pool));
//! let gateway = Arc::new(StripeGateway::new(config.stripe_config(), Arc::new(SystemClock))?);
//!
//! let bookings = BookingService::new(store.clone(), catalog, gateway.clone(), notifier, clock);
//! let reconciler = WebhookReconciler::new(store.clone(), gateway, true);
//! let app = build_router(AppState::new(Arc::new(bookings), Arc::new(reconciler), store));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod server;
pub mod services;

pub use config::{Config, ConfigError};
pub use notify::{ConsoleNotifier, SmtpNotifier};
pub use server::{build_router, AppState};
pub use services::{
    AvailabilityChecker, BookingService, Guest, HotelDashboard, NewBooking, ReconcileOutcome,
    UnmappedReason, WebhookReconciler,
};
