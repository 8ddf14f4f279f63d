//! Booking store backed by the `bookings` table.

use crate::{backend, is_exclusion_violation, to_i64, to_u64};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quickstay_core::{
    Booking, BookingId, BookingStore, HotelId, Money, PaymentStatus, PaymentUpdate, RoomId,
    StoreError, UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, room_id, hotel_id, user_id, check_in_date, check_out_date, \
     guests, total_price_cents, payment_status, payment_method, created_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    room_id: Uuid,
    hotel_id: Uuid,
    user_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    guests: i32,
    total_price_cents: i64,
    payment_status: String,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BookingId::from_uuid(row.id),
            room_id: RoomId::from_uuid(row.room_id),
            hotel_id: HotelId::from_uuid(row.hotel_id),
            user_id: UserId::from_uuid(row.user_id),
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            guests: u32::try_from(row.guests)
                .map_err(|_| StoreError::Backend(format!("guests is negative: {}", row.guests)))?,
            total_price: Money::from_cents(to_u64(row.total_price_cents, "total_price_cents")?),
            payment_status: row.payment_status.parse().map_err(StoreError::Backend)?,
            payment_method: row.payment_method,
            created_at: row.created_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, StoreError> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// `PostgreSQL` [`BookingStore`].
///
/// Overlap is enforced by the `bookings_no_overlap` exclusion constraint;
/// an insert that violates it fails with [`StoreError::Overlap`].
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_overlapping(
        &self,
        room: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE room_id = $1
               AND payment_status <> 'cancelled'
               AND check_in_date <= $3
               AND check_out_date >= $2"
        ))
        .bind(room.as_uuid())
        .bind(check_in)
        .bind(check_out)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("Failed to query overlapping bookings", &e))?;

        into_bookings(rows)
    }

    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO bookings
                (id, room_id, hotel_id, user_id, check_in_date, check_out_date,
                 guests, total_price_cents, payment_status, payment_method, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.room_id.as_uuid())
        .bind(booking.hotel_id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(i32::try_from(booking.guests).map_err(|_| {
            StoreError::Backend(format!("guests out of range: {}", booking.guests))
        })?)
        .bind(to_i64(booking.total_price.cents(), "total_price_cents")?)
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_method.as_deref())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_exclusion_violation(&e) => {
                metrics::counter!("quickstay_booking_overlap_rejections_total").increment(1);
                tracing::debug!(room_id = %booking.room_id, "Exclusion constraint rejected booking");
                Err(StoreError::Overlap {
                    room_id: booking.room_id,
                })
            },
            Err(e) => Err(backend("Failed to insert booking", &e)),
        }
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("Failed to get booking", &e))?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_by_user(&self, user: UserId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("Failed to list user bookings", &e))?;

        into_bookings(rows)
    }

    async fn list_by_hotel(&self, hotel: HotelId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE hotel_id = $1 ORDER BY created_at DESC"
        ))
        .bind(hotel.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("Failed to list hotel bookings", &e))?;

        into_bookings(rows)
    }

    async fn mark_paid(&self, id: BookingId, method: &str) -> Result<PaymentUpdate, StoreError> {
        // Conditional on 'unpaid' so redelivered events never write twice
        let updated = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings
             SET payment_status = $2, payment_method = $3
             WHERE id = $1 AND payment_status = $4
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(PaymentStatus::Paid.as_str())
        .bind(method)
        .bind(PaymentStatus::Unpaid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("Failed to mark booking paid", &e))?;

        if let Some(row) = updated {
            return Ok(PaymentUpdate::Applied(row.try_into()?));
        }

        Ok(match self.get(id).await? {
            Some(booking) => PaymentUpdate::Unchanged(booking),
            None => PaymentUpdate::Missing,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| backend("Database ping failed", &e))
    }
}
