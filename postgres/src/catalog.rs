//! Rooms and hotels.

use crate::{backend, to_i64, to_u64};
use async_trait::async_trait;
use quickstay_core::{
    Hotel, HotelId, Money, Room, RoomCatalog, RoomId, RoomListing, StoreError, UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    address: String,
    owner_id: Uuid,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Self {
            id: HotelId::from_uuid(row.id),
            name: row.name,
            address: row.address,
            owner: UserId::from_uuid(row.owner_id),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    room_id: Uuid,
    room_type: String,
    price_per_night_cents: i64,
    hotel_id: Uuid,
    hotel_name: String,
    hotel_address: String,
    owner_id: Uuid,
}

/// `PostgreSQL` [`RoomCatalog`].
#[derive(Clone)]
pub struct PostgresRoomCatalog {
    pool: PgPool,
}

impl PostgresRoomCatalog {
    /// Create a catalog over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a hotel.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the insert fails.
    pub async fn insert_hotel(&self, hotel: &Hotel) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO hotels (id, name, address, owner_id) VALUES ($1, $2, $3, $4)")
            .bind(hotel.id.as_uuid())
            .bind(&hotel.name)
            .bind(&hotel.address)
            .bind(hotel.owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| backend("Failed to insert hotel", &e))?;
        Ok(())
    }

    /// Insert a room. Its hotel must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the insert fails.
    pub async fn insert_room(&self, room: &Room) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rooms (id, hotel_id, room_type, price_per_night_cents)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(room.id.as_uuid())
        .bind(room.hotel_id.as_uuid())
        .bind(&room.room_type)
        .bind(to_i64(room.price_per_night.cents(), "price_per_night_cents")?)
        .execute(&self.pool)
        .await
        .map_err(|e| backend("Failed to insert room", &e))?;
        Ok(())
    }
}

#[async_trait]
impl RoomCatalog for PostgresRoomCatalog {
    async fn room_listing(&self, room: RoomId) -> Result<Option<RoomListing>, StoreError> {
        let row = sqlx::query_as::<_, ListingRow>(
            "SELECT r.id AS room_id, r.room_type, r.price_per_night_cents,
                    h.id AS hotel_id, h.name AS hotel_name, h.address AS hotel_address, h.owner_id
             FROM rooms r
             JOIN hotels h ON h.id = r.hotel_id
             WHERE r.id = $1",
        )
        .bind(room.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("Failed to load room", &e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hotel_id = HotelId::from_uuid(row.hotel_id);
        Ok(Some(RoomListing {
            room: Room {
                id: RoomId::from_uuid(row.room_id),
                hotel_id,
                room_type: row.room_type,
                price_per_night: Money::from_cents(to_u64(
                    row.price_per_night_cents,
                    "price_per_night_cents",
                )?),
            },
            hotel: Hotel {
                id: hotel_id,
                name: row.hotel_name,
                address: row.hotel_address,
                owner: UserId::from_uuid(row.owner_id),
            },
        }))
    }

    async fn hotel_owned_by(&self, owner: UserId) -> Result<Option<Hotel>, StoreError> {
        let row = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, address, owner_id FROM hotels WHERE owner_id = $1",
        )
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("Failed to load hotel", &e))?;

        Ok(row.map(Hotel::from))
    }
}
