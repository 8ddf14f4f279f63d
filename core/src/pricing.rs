//! Stay pricing.
//!
//! `total = price_per_night × nights`, where nights is the number of whole
//! days between check-in and check-out. Dates carry no time of day, so the
//! day count is already the ceiling of the elapsed time.

use crate::error::BookingError;
use crate::types::Money;
use chrono::NaiveDate;

/// Number of nights between check-in and check-out.
///
/// # Errors
///
/// Returns [`BookingError::InvalidDateRange`] unless check-out is at least one
/// day after check-in.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<u64, BookingError> {
    let days = (check_out - check_in).num_days();
    u64::try_from(days)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(BookingError::InvalidDateRange)
}

/// Total price of a stay.
///
/// # Errors
///
/// - [`BookingError::InvalidDateRange`] if the stay is shorter than one night
/// - [`BookingError::InvalidAmount`] if the total overflows
pub fn total_price(
    price_per_night: Money,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Money, BookingError> {
    let nights = nights(check_in, check_out)?;
    price_per_night
        .checked_mul(nights)
        .ok_or(BookingError::InvalidAmount)
}
