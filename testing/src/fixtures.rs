//! Sample catalog entries, bookings and webhook payloads.

use crate::mocks::test_clock;
use chrono::NaiveDate;
use quickstay_core::{
    Booking, BookingId, Clock, Hotel, HotelId, Money, PaymentStatus, Room, RoomId, RoomListing,
    UserId,
};
use serde_json::json;

/// Calendar date shorthand. Falls back to the epoch date on invalid input.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// A hotel owned by `owner`.
#[must_use]
pub fn hotel(owner: UserId) -> Hotel {
    Hotel {
        id: HotelId::new(),
        name: "Urbanza Suites".to_string(),
        address: "Main Road 123 Street, 23 Colony".to_string(),
        owner,
    }
}

/// A "Double Bed" room of `hotel` at `price_major` whole currency units per night.
#[must_use]
pub fn room(hotel: &Hotel, price_major: u64) -> Room {
    Room {
        id: RoomId::new(),
        hotel_id: hotel.id,
        room_type: "Double Bed".to_string(),
        price_per_night: Money::checked_from_major(price_major).unwrap_or(Money::ZERO),
    }
}

/// A room and its hotel, owned by a fresh user.
#[must_use]
pub fn listing(price_major: u64) -> RoomListing {
    let hotel = hotel(UserId::new());
    RoomListing {
        room: room(&hotel, price_major),
        hotel,
    }
}

/// An unpaid booking of `room` by a fresh user, priced at 100.00 per night.
#[must_use]
pub fn unpaid_booking(room: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> Booking {
    let nights = u64::try_from((check_out - check_in).num_days()).unwrap_or(0);
    Booking {
        id: BookingId::new(),
        room_id: room,
        hotel_id: HotelId::new(),
        user_id: UserId::new(),
        check_in_date: check_in,
        check_out_date: check_out,
        guests: 2,
        total_price: Money::from_cents(10_000 * nights),
        payment_status: PaymentStatus::Unpaid,
        payment_method: None,
        created_at: test_clock().now(),
    }
}

/// `checkout.session.completed` body. `booking_ref: None` omits the metadata.
#[must_use]
pub fn checkout_completed_payload(event_id: &str, booking_ref: Option<&str>) -> Vec<u8> {
    let metadata = booking_ref.map_or_else(|| json!({}), |id| json!({ "bookingId": id }));
    json!({
        "id": event_id,
        "object": "event",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": format!("cs_{event_id}"),
                "object": "checkout.session",
                "payment_intent": format!("pi_{event_id}"),
                "payment_status": "paid",
                "metadata": metadata
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// `payment_intent.succeeded` body for `payment_intent`.
#[must_use]
pub fn payment_intent_succeeded_payload(event_id: &str, payment_intent: &str) -> Vec<u8> {
    json!({
        "id": event_id,
        "object": "event",
        "type": "payment_intent.succeeded",
        "data": {
            "object": {
                "id": payment_intent,
                "object": "payment_intent",
                "status": "succeeded"
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// Body of an event type the reconciler does not handle.
#[must_use]
pub fn other_event_payload(event_id: &str, kind: &str) -> Vec<u8> {
    json!({
        "id": event_id,
        "object": "event",
        "type": kind,
        "data": { "object": { "id": "obj_1" } }
    })
    .to_string()
    .into_bytes()
}
