//! Room availability predicate.
//!
//! Two stays overlap when `a.check_in ≤ b.check_out AND a.check_out ≥ b.check_in`.
//! Both bounds are inclusive, so a stay that starts on another stay's
//! departure day counts as a conflict. The database exclusion constraint uses
//! the same closed-interval semantics (`daterange(.., .., '[]')`).

use crate::types::Booking;
use chrono::NaiveDate;

/// Inclusive-bound overlap test between two stays.
#[must_use]
pub fn ranges_overlap(
    a_check_in: NaiveDate,
    a_check_out: NaiveDate,
    b_check_in: NaiveDate,
    b_check_out: NaiveDate,
) -> bool {
    a_check_in <= b_check_out && a_check_out >= b_check_in
}

/// Whether a room with the given bookings is free for `[check_in, check_out]`.
///
/// Cancelled bookings never block.
pub fn is_free<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> bool {
    !bookings
        .into_iter()
        .any(|booking| booking.blocks(check_in, check_out))
}
