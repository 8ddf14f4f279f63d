//! Dependency injection traits.
//!
//! All external dependencies of the workflow are abstracted behind traits and
//! passed in explicitly. Production implementations live in
//! `quickstay-postgres`, `quickstay-stripe` and the application crate; test
//! implementations live in `quickstay-testing`.

use crate::error::{NotifyError, StoreError};
use crate::types::{Booking, BookingId, Hotel, HotelId, Money, RoomId, RoomListing, UserId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```ignore
/// // Test - fixed time for deterministic tests
/// struct FixedClock { time: DateTime<Utc> }
/// impl Clock for FixedClock {
///     fn now(&self) -> DateTime<Utc> {
///         self.time
///     }
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of a conditional `unpaid → paid` update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentUpdate {
    /// The booking was `unpaid` and is now `paid`
    Applied(Booking),
    /// The booking exists but was not `unpaid`; nothing was written
    Unchanged(Booking),
    /// No booking with that id
    Missing,
}

/// Persistent record of bookings; single source of truth for booking state.
///
/// # Concurrency contract
///
/// [`BookingStore::insert`] must re-check the overlap invariant atomically
/// with the write and fail with [`StoreError::Overlap`] when a conflicting,
/// non-cancelled booking exists. Implementations use a storage-level exclusion
/// constraint or hold a per-room lock across check and write.
///
/// [`BookingStore::mark_paid`] must only write when the current status is
/// `unpaid`, so that redelivered webhook events commute.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Non-cancelled bookings of `room` overlapping `[check_in, check_out]`
    /// (inclusive bounds).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn find_overlapping(
        &self,
        room: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Insert a new booking.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Overlap`] if the stay conflicts with an existing booking
    /// - [`StoreError::Backend`] if the write fails
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    /// Load a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError>;

    /// Bookings made by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn list_by_user(&self, user: UserId) -> Result<Vec<Booking>, StoreError>;

    /// Bookings of rooms in `hotel`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn list_by_hotel(&self, hotel: HotelId) -> Result<Vec<Booking>, StoreError>;

    /// Flip `unpaid → paid` and record the payment method.
    ///
    /// Idempotent: a booking that is already `paid` (or `cancelled`) is
    /// returned as [`PaymentUpdate::Unchanged`] without a write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the update fails.
    async fn mark_paid(&self, id: BookingId, method: &str) -> Result<PaymentUpdate, StoreError>;

    /// Cheap reachability probe for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the store is unreachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read-only access to rooms and hotels.
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    /// Load a room together with its owning hotel.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn room_listing(&self, room: RoomId) -> Result<Option<RoomListing>, StoreError>;

    /// The hotel owned by `owner`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn hotel_owned_by(&self, owner: UserId) -> Result<Option<Hotel>, StoreError>;
}

/// Contents of a booking confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingNotice {
    /// Recipient address
    pub recipient_email: String,
    /// Recipient display name
    pub recipient_name: String,
    /// Booking identifier
    pub booking_id: BookingId,
    /// Hotel name
    pub hotel_name: String,
    /// Hotel address
    pub hotel_address: String,
    /// First night
    pub check_in_date: NaiveDate,
    /// Departure day
    pub check_out_date: NaiveDate,
    /// Amount due
    pub total_price: Money,
}

/// Booking confirmation delivery.
///
/// Fire-and-forget: callers log failures and never surface them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a booking confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message cannot be built or delivered.
    async fn booking_confirmed(&self, notice: &BookingNotice) -> Result<(), NotifyError>;
}
