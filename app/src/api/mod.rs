//! HTTP handlers.
//!
//! Thin adapters from JSON requests to the booking services. Every handler
//! returns `Result<_, AppError>`; domain errors are mapped by the `From`
//! impls in `quickstay-web`.

pub mod bookings;
pub mod payments;
pub mod webhook;
