//! Domain types for the booking workflow.
//!
//! Identifiers, money, and the `Booking`/`Room`/`Hotel` records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a booking
    BookingId
);
uuid_id!(
    /// Unique identifier for a room
    RoomId
);
uuid_id!(
    /// Unique identifier for a hotel
    HotelId
);
uuid_id!(
    /// Unique identifier for an authenticated user
    UserId
);

// ============================================================================
// Money
// ============================================================================

/// Monetary amount in minor units (cents).
///
/// All arithmetic is integer and checked. Converting to the gateway's minor
/// units is therefore exact: there is nothing to round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole currency units, with overflow checking
    #[must_use]
    pub const fn checked_from_major(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a count (nights, quantity) with overflow checking
    #[must_use]
    pub const fn checked_mul(self, factor: u64) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Catalog (read-only to the workflow)
// ============================================================================

/// A hotel, owned by exactly one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Hotel identifier
    pub id: HotelId,
    /// Display name
    pub name: String,
    /// Street address, shown in the confirmation email
    pub address: String,
    /// Owning user (hotel dashboard access)
    pub owner: UserId,
}

/// A bookable room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Owning hotel
    pub hotel_id: HotelId,
    /// Room type label ("Double Bed", "Luxury Room", ...)
    pub room_type: String,
    /// Nightly price
    pub price_per_night: Money,
}

/// A room together with its owning hotel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomListing {
    /// The room
    pub room: Room,
    /// The hotel that owns it
    pub hotel: Hotel,
}

// ============================================================================
// Booking
// ============================================================================

/// Payment status of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created, awaiting payment
    Unpaid,
    /// Payment confirmed by the gateway (terminal)
    Paid,
    /// Cancelled; excluded from availability checks
    Cancelled,
}

impl PaymentStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this booking still holds its room.
    #[must_use]
    pub const fn holds_room(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// A room reservation.
///
/// Created `unpaid` by the booking service and flipped to `paid` at most once
/// by the webhook reconciler. Bookings are never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Reserved room
    pub room_id: RoomId,
    /// Hotel owning the room
    pub hotel_id: HotelId,
    /// Guest who made the booking
    pub user_id: UserId,
    /// First night
    pub check_in_date: NaiveDate,
    /// Departure day
    pub check_out_date: NaiveDate,
    /// Number of guests
    pub guests: u32,
    /// `price_per_night × nights`
    pub total_price: Money,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// How the booking was paid, once paid
    pub payment_method: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the gateway has confirmed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Whether this booking blocks the given stay on its room.
    #[must_use]
    pub fn blocks(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.payment_status.holds_room()
            && crate::availability::ranges_overlap(
                self.check_in_date,
                self.check_out_date,
                check_in,
                check_out,
            )
    }
}
