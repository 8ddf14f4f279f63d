//! In-memory booking store and room catalog.

use async_trait::async_trait;
use chrono::NaiveDate;
use quickstay_core::{
    Booking, BookingId, BookingStore, Hotel, HotelId, PaymentStatus, PaymentUpdate, RoomCatalog,
    RoomId, RoomListing, StoreError, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// In-memory [`BookingStore`].
///
/// Inserts hold a per-room mutex across the overlap check and the write,
/// which is the application-level counterpart of the Postgres exclusion
/// constraint. Every successful mutation bumps a write counter.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
    room_locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
    writes: AtomicUsize,
    failing: AtomicBool,
    insert_delay: Option<Duration>,
}

impl InMemoryBookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause inside the critical section of every insert.
    ///
    /// Widens the check-then-write window so concurrency tests exercise the
    /// per-room lock.
    #[must_use]
    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    /// Make every operation fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful mutations (inserts and applied status flips).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Seed a booking directly, bypassing the overlap check.
    pub async fn seed(&self, booking: Booking) {
        self.bookings.write().await.insert(booking.id, booking);
    }

    /// Snapshot of all bookings.
    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.read().await.values().cloned().collect()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("in-memory store set to fail".to_string()))
        } else {
            Ok(())
        }
    }

    async fn room_lock(&self, room: RoomId) -> Arc<Mutex<()>> {
        let mut locks = self.room_locks.lock().await;
        Arc::clone(locks.entry(room).or_default())
    }

    async fn collect_newest_first(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|booking| keep(booking))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_overlapping(
        &self,
        room: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        Ok(self
            .collect_newest_first(|booking| {
                booking.room_id == room && booking.blocks(check_in, check_out)
            })
            .await)
    }

    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        self.check_available()?;

        let lock = self.room_lock(booking.room_id).await;
        let _guard = lock.lock().await;

        let conflict = self.bookings.read().await.values().any(|existing| {
            existing.room_id == booking.room_id
                && booking.payment_status.holds_room()
                && existing.blocks(booking.check_in_date, booking.check_out_date)
        });
        if conflict {
            return Err(StoreError::Overlap {
                room_id: booking.room_id,
            });
        }

        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }

        self.bookings.write().await.insert(booking.id, booking.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_by_user(&self, user: UserId) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        Ok(self.collect_newest_first(|booking| booking.user_id == user).await)
    }

    async fn list_by_hotel(&self, hotel: HotelId) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        Ok(self.collect_newest_first(|booking| booking.hotel_id == hotel).await)
    }

    async fn mark_paid(&self, id: BookingId, method: &str) -> Result<PaymentUpdate, StoreError> {
        self.check_available()?;

        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(PaymentUpdate::Missing);
        };

        if booking.payment_status != PaymentStatus::Unpaid {
            return Ok(PaymentUpdate::Unchanged(booking.clone()));
        }

        booking.payment_status = PaymentStatus::Paid;
        booking.payment_method = Some(method.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentUpdate::Applied(booking.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

/// Static [`RoomCatalog`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoomCatalog {
    listings: HashMap<RoomId, RoomListing>,
    hotels_by_owner: HashMap<UserId, Hotel>,
}

impl InMemoryRoomCatalog {
    /// Build a catalog from room listings.
    #[must_use]
    pub fn new(listings: impl IntoIterator<Item = RoomListing>) -> Self {
        let mut catalog = Self::default();
        for listing in listings {
            catalog
                .hotels_by_owner
                .insert(listing.hotel.owner, listing.hotel.clone());
            catalog.listings.insert(listing.room.id, listing);
        }
        catalog
    }
}

#[async_trait]
impl RoomCatalog for InMemoryRoomCatalog {
    async fn room_listing(&self, room: RoomId) -> Result<Option<RoomListing>, StoreError> {
        Ok(self.listings.get(&room).cloned())
    }

    async fn hotel_owned_by(&self, owner: UserId) -> Result<Option<Hotel>, StoreError> {
        Ok(self.hotels_by_owner.get(&owner).cloned())
    }
}
