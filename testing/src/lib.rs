//! # QuickStay Testing
//!
//! Test doubles and fixtures for the booking workflow.
//!
//! This crate provides:
//! - `FixedClock`: deterministic time
//! - `InMemoryBookingStore`: booking store with a per-room lock and a write
//!   counter
//! - `InMemoryRoomCatalog`: static rooms and hotels
//! - `MockPaymentGateway`: records checkout requests and verifies webhooks
//!   with the real Stripe signature scheme
//! - `RecordingNotifier`: captures confirmations, optionally failing
//! - `fixtures`: sample hotels, rooms and webhook payloads
//!
//! ## Example
//!
//! ```ignore
//! use quickstay_testing::{fixtures, InMemoryBookingStore, InMemoryRoomCatalog};
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let listing = fixtures::listing(100);
//!     let catalog = InMemoryRoomCatalog::new([listing.clone()]);
//!     let store = InMemoryBookingStore::new();
//!     // build the service under test from these ...
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use quickstay_core::Clock;

pub mod fixtures;
pub mod gateway;
pub mod notifier;
pub mod store;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use quickstay_testing::mocks::FixedClock;
    /// use quickstay_core::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2024-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }
}

// Re-export commonly used items
pub use gateway::MockPaymentGateway;
pub use mocks::{test_clock, FixedClock};
pub use notifier::RecordingNotifier;
pub use store::{InMemoryBookingStore, InMemoryRoomCatalog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().timestamp(), 1_704_067_200);
    }
}
