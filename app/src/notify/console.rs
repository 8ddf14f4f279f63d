//! Console notifier for development.

use async_trait::async_trait;
use quickstay_core::{BookingNotice, NotifyError, Notifier};
use tracing::info;

/// Logs confirmations instead of sending them.
#[derive(Clone, Debug)]
pub struct ConsoleNotifier {
    currency_symbol: String,
}

impl ConsoleNotifier {
    /// Create a console notifier.
    #[must_use]
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn booking_confirmed(&self, notice: &BookingNotice) -> Result<(), NotifyError> {
        info!(
            to = %notice.recipient_email,
            booking_id = %notice.booking_id,
            hotel = %notice.hotel_name,
            check_in = %notice.check_in_date,
            check_out = %notice.check_out_date,
            total = %format!("{} {}", self.currency_symbol, notice.total_price),
            "📧 Booking confirmation (development mode)"
        );
        Ok(())
    }
}
