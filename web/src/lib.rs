//! Axum integration for QuickStay.
//!
//! Handlers stay thin: extract, call a service, map the result.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Axum (shell)               │  ← JSON, headers, raw bodies
//! │  - extractors: Caller, RequestOrigin    │  ← correlation ids, tracing
//! │  - AppError → {success:false, ...}      │
//! ├─────────────────────────────────────────┤
//! │       Services (quickstay app)          │  ← booking, payment, webhook
//! │  - talk to the environment traits       │  ← store, gateway, notifier
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use quickstay_web::{AppError, Caller};
//! use axum::{Json, extract::State};
//!
//! async fn list_mine(
//!     State(state): State<AppState>,
//!     caller: Caller,
//! ) -> Result<Json<Vec<Booking>>, AppError> {
//!     Ok(Json(state.bookings.list_user_bookings(caller.user_id).await?))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{Caller, CorrelationId, RequestOrigin};
pub use middleware::{correlation_id, CORRELATION_ID_HEADER};
