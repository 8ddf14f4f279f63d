//! Availability checks.

use chrono::NaiveDate;
use quickstay_core::availability::is_free;
use quickstay_core::{BookingStore, RoomId};
use std::sync::Arc;

/// Answers "is this room free for these dates?".
///
/// Advisory only: the store re-enforces the overlap rule atomically on
/// insert. Storage failures answer `false`.
#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityChecker {
    /// Create a checker over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Whether no non-cancelled booking of `room` overlaps the stay
    /// (inclusive bounds).
    #[tracing::instrument(skip(self))]
    pub async fn is_available(&self, room: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        match self.store.find_overlapping(room, check_in, check_out).await {
            Ok(bookings) => {
                let free = is_free(&bookings, check_in, check_out);
                tracing::debug!(free, conflicts = bookings.len(), "Availability checked");
                free
            },
            Err(e) => {
                metrics::counter!("quickstay_availability_errors_total").increment(1);
                tracing::error!(error = %e, "Availability check failed, reporting unavailable");
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickstay_testing::fixtures::{date, unpaid_booking};
    use quickstay_testing::InMemoryBookingStore;
    use quickstay_core::PaymentStatus;

    #[tokio::test]
    async fn test_inclusive_overlap() {
        let store = Arc::new(InMemoryBookingStore::new());
        let room = RoomId::new();
        store.seed(unpaid_booking(room, date(2024, 1, 1), date(2024, 1, 4))).await;
        let checker = AvailabilityChecker::new(store);

        assert!(!checker.is_available(room, date(2024, 1, 3), date(2024, 1, 5)).await);
        // Boundary day is shared
        assert!(!checker.is_available(room, date(2024, 1, 4), date(2024, 1, 6)).await);
        assert!(checker.is_available(room, date(2024, 1, 5), date(2024, 1, 6)).await);
        assert!(checker.is_available(RoomId::new(), date(2024, 1, 1), date(2024, 1, 4)).await);
    }

    #[tokio::test]
    async fn test_cancelled_bookings_do_not_block() {
        let store = Arc::new(InMemoryBookingStore::new());
        let room = RoomId::new();
        let mut cancelled = unpaid_booking(room, date(2024, 1, 1), date(2024, 1, 4));
        cancelled.payment_status = PaymentStatus::Cancelled;
        store.seed(cancelled).await;

        let checker = AvailabilityChecker::new(store);
        assert!(checker.is_available(room, date(2024, 1, 2), date(2024, 1, 3)).await);
    }

    #[tokio::test]
    async fn test_fails_closed() {
        let store = Arc::new(InMemoryBookingStore::new());
        store.set_failing(true);
        let checker = AvailabilityChecker::new(store);

        assert!(!checker.is_available(RoomId::new(), date(2024, 1, 1), date(2024, 1, 2)).await);
    }
}
