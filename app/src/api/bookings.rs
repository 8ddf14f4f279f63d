//! Booking endpoints.
//!
//! - `POST /api/bookings/check-availability`: is a room free for a stay
//! - `POST /api/bookings`: create an unpaid booking (requires auth)
//! - `GET /api/bookings/user`: the caller's bookings (requires auth)
//! - `GET /api/bookings/hotel`: dashboard for the caller's hotel (requires auth)

use crate::server::state::AppState;
use crate::services::{Guest, HotelDashboard, NewBooking};
use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use quickstay_core::{Booking, RoomId};
use quickstay_web::{AppError, Caller, CorrelationId};
use serde::{Deserialize, Serialize};

/// Message returned after a booking is created.
pub const BOOKING_CREATED: &str = "Booking Created Successfully";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Availability query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// Room to check
    pub room: RoomId,
    /// First night
    pub check_in_date: NaiveDate,
    /// Departure day
    pub check_out_date: NaiveDate,
}

/// Availability answer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Always `true` for answered queries
    pub success: bool,
    /// Whether the room is free for the whole stay
    pub is_available: bool,
}

/// Booking request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Room to reserve
    pub room: RoomId,
    /// First night
    pub check_in_date: NaiveDate,
    /// Departure day
    pub check_out_date: NaiveDate,
    /// Number of guests
    pub guests: u32,
}

/// Created booking.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    /// Always `true`
    pub success: bool,
    /// Human readable confirmation
    pub message: String,
    /// The new booking (`unpaid`)
    pub booking: Booking,
}

/// Bookings of the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserBookingsResponse {
    /// Always `true`
    pub success: bool,
    /// Newest first
    pub bookings: Vec<Booking>,
}

/// Dashboard of the caller's hotel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Always `true`
    pub success: bool,
    /// Totals and bookings
    pub dashboard_data: HotelDashboard,
}

// ============================================================================
// Handlers
// ============================================================================

/// Check whether a room is free for the requested dates.
///
/// Storage failures answer `isAvailable: false` rather than an error.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/bookings/check-availability \
///   -H "Content-Type: application/json" \
///   -d '{"room":"<uuid>","checkInDate":"2024-01-01","checkOutDate":"2024-01-04"}'
/// ```
pub async fn check_availability(
    State(state): State<AppState>,
    Json(request): Json<AvailabilityRequest>,
) -> Json<AvailabilityResponse> {
    let is_available = state
        .bookings
        .availability()
        .is_available(request.room, request.check_in_date, request.check_out_date)
        .await;

    Json(AvailabilityResponse {
        success: true,
        is_available,
    })
}

/// Create an unpaid booking for the caller.
///
/// # Errors
///
/// - 409 if the room is taken for any of the dates
/// - 404 if the room does not exist
/// - 400 for an empty stay or zero guests
pub async fn create_booking(
    State(state): State<AppState>,
    caller: Caller,
    correlation_id: CorrelationId,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        user_id = %caller.user_id,
        room = %request.room,
        "Creating booking"
    );

    let guest = Guest {
        user_id: caller.user_id,
        email: caller.email,
        name: caller.name,
    };
    let booking = state
        .bookings
        .create_booking(
            NewBooking {
                room: request.room,
                check_in: request.check_in_date,
                check_out: request.check_out_date,
                guests: request.guests,
            },
            &guest,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            message: BOOKING_CREATED.to_string(),
            booking,
        }),
    ))
}

/// List the caller's bookings, newest first.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_user_bookings(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UserBookingsResponse>, AppError> {
    let bookings = state.bookings.list_user_bookings(caller.user_id).await?;
    Ok(Json(UserBookingsResponse {
        success: true,
        bookings,
    }))
}

/// Dashboard for the hotel owned by the caller.
///
/// # Errors
///
/// - 404 if the caller owns no hotel
/// - 500 on storage failure
pub async fn hotel_dashboard(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard_data = state.bookings.hotel_dashboard(caller.user_id).await?;
    Ok(Json(DashboardResponse {
        success: true,
        dashboard_data,
    }))
}
