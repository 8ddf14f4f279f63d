//! Application services.
//!
//! Services hold their collaborators as trait objects and contain the
//! workflow logic; HTTP handlers only translate requests and responses.

pub mod availability;
pub mod booking;
pub mod reconciler;

pub use availability::AvailabilityChecker;
pub use booking::{BookingService, Guest, HotelDashboard, NewBooking};
pub use reconciler::{ReconcileOutcome, UnmappedReason, WebhookReconciler};
