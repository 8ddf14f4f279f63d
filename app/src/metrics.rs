//! Prometheus metrics.
//!
//! Counters are emitted with the `metrics` macros where the events happen;
//! this module describes them and installs the Prometheus recorder whose
//! handle backs the `/metrics` route.

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install the Prometheus recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Install the global Prometheus recorder and describe all counters.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a recorder is already installed.
pub fn install() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;
    register_metrics();
    Ok(handle)
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "quickstay_bookings_total",
        "Booking attempts by outcome (created, unavailable, conflict)"
    );
    describe_counter!(
        "quickstay_checkout_sessions_total",
        "Checkout session requests by outcome"
    );
    describe_counter!(
        "quickstay_webhook_events_total",
        "Webhook deliveries by outcome (applied, already_paid, ignored, unmapped, rejected)"
    );
    describe_counter!(
        "quickstay_notifications_failed_total",
        "Booking confirmations that could not be delivered"
    );
    describe_counter!(
        "quickstay_availability_errors_total",
        "Availability checks answered 'unavailable' because storage failed"
    );
    describe_counter!(
        "quickstay_booking_overlap_rejections_total",
        "Inserts rejected by the database overlap constraint"
    );
}
