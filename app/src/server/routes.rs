//! Router configuration.

use super::health::{health_check, metrics, readiness_check};
use super::state::AppState;
use crate::api::{bookings, payments, webhook};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use quickstay_web::correlation_id;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `/health`, `/ready`, `/metrics`
/// - `/api/bookings/*` booking and payment session endpoints
/// - `/api/stripe` webhook (raw body)
///
/// Every request runs inside a correlation-id span.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/check-availability", post(bookings::check_availability))
        .route("/bookings/user", get(bookings::list_user_bookings))
        .route("/bookings/hotel", get(bookings::hotel_dashboard))
        .route("/bookings/stripe-payment", post(payments::create_payment_session))
        .route("/stripe", post(webhook::stripe_webhook));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
