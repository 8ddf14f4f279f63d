//! Booking confirmation delivery.
//!
//! - [`SmtpNotifier`]: sends the confirmation email through an SMTP relay
//! - [`ConsoleNotifier`]: logs the confirmation (development)
//!
//! Both render the same message with [`render_confirmation`].

mod console;
mod smtp;

pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;

use quickstay_core::BookingNotice;

/// Subject line of the confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "Hotel Booking Details";

/// HTML body of the confirmation email.
///
/// Dates render as `Mon Jan 01 2024`; the total is prefixed with
/// `currency_symbol`.
#[must_use]
pub fn render_confirmation(notice: &BookingNotice, currency_symbol: &str) -> String {
    format!(
        r#"<h2>Your Booking Details</h2>
<p>Dear {name},</p>
<p>Thank you for your booking! Here are your details:</p>
<ul>
  <li><strong>Booking ID:</strong> {id}</li>
  <li><strong>Hotel Name:</strong> {hotel}</li>
  <li><strong>Location:</strong> {address}</li>
  <li><strong>Check-In:</strong> {check_in}</li>
  <li><strong>Check-Out:</strong> {check_out}</li>
  <li><strong>Total Amount:</strong> {currency} {total}</li>
</ul>
<p>We look forward to welcoming you!</p>
<p>If you need to make any changes, feel free to contact us.</p>
"#,
        name = escape_html(&notice.recipient_name),
        id = notice.booking_id,
        hotel = escape_html(&notice.hotel_name),
        address = escape_html(&notice.hotel_address),
        check_in = notice.check_in_date.format("%a %b %d %Y"),
        check_out = notice.check_out_date.format("%a %b %d %Y"),
        currency = escape_html(currency_symbol),
        total = notice.total_price,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
