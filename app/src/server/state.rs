//! Application state for the HTTP server.

use crate::services::{BookingService, WebhookReconciler};
use metrics_exporter_prometheus::PrometheusHandle;
use quickstay_core::BookingStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Booking workflow (availability, creation, payment sessions, listings)
    pub bookings: Arc<BookingService>,

    /// Webhook reconciliation
    pub reconciler: Arc<WebhookReconciler>,

    /// Booking store, probed by the readiness check
    pub store: Arc<dyn BookingStore>,

    /// Prometheus handle for `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        bookings: Arc<BookingService>,
        reconciler: Arc<WebhookReconciler>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            bookings,
            reconciler,
            store,
            metrics: None,
        }
    }

    /// Expose metrics through `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
