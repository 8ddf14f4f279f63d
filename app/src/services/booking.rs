//! Booking service: create bookings, start payments, list bookings.

use super::availability::AvailabilityChecker;
use chrono::NaiveDate;
use quickstay_core::pricing::total_price;
use quickstay_core::{
    Booking, BookingError, BookingId, BookingNotice, BookingStore, CheckoutRequest, Clock,
    GatewayError, Money, Notifier, PaymentGateway, PaymentStatus, RoomCatalog, RoomId,
    RoomListing, UserId,
};
use serde::Serialize;
use std::sync::Arc;

/// Path the browser returns to after a successful checkout.
pub const SUCCESS_PATH: &str = "/loader/my-bookings";
/// Path the browser returns to after an abandoned checkout.
pub const CANCEL_PATH: &str = "/my-bookings";

/// The user making a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    /// User id
    pub user_id: UserId,
    /// Confirmation recipient
    pub email: String,
    /// Display name
    pub name: String,
}

/// A booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBooking {
    /// Room to book
    pub room: RoomId,
    /// First night
    pub check_in: NaiveDate,
    /// Departure day
    pub check_out: NaiveDate,
    /// Number of guests
    pub guests: u32,
}

/// Hotel owner's overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDashboard {
    /// Number of bookings
    pub total_bookings: usize,
    /// Sum of booking totals
    pub total_revenue: Money,
    /// Bookings, newest first
    pub bookings: Vec<Booking>,
}

/// Booking workflow.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RoomCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityChecker,
}

impl BookingService {
    /// Create the service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RoomCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(Arc::clone(&store)),
            store,
            catalog,
            gateway,
            notifier,
            clock,
        }
    }

    /// The availability checker used by this service.
    #[must_use]
    pub const fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Create an `unpaid` booking and send the confirmation in the background.
    ///
    /// # Errors
    ///
    /// - [`BookingError::RoomUnavailable`] if the stay overlaps another booking,
    ///   including one committed concurrently
    /// - [`BookingError::NotFound`] if the room does not exist
    /// - [`BookingError::InvalidDateRange`] / [`BookingError::InvalidGuestCount`]
    ///   for malformed requests
    /// - [`BookingError::Storage`] if the store fails
    #[tracing::instrument(skip(self, guest), fields(user_id = %guest.user_id, room_id = %request.room))]
    pub async fn create_booking(&self, request: NewBooking, guest: &Guest) -> Result<Booking, BookingError> {
        if !self
            .availability
            .is_available(request.room, request.check_in, request.check_out)
            .await
        {
            metrics::counter!("quickstay_bookings_total", "outcome" => "unavailable").increment(1);
            return Err(BookingError::RoomUnavailable);
        }

        let listing = self.listing(request.room).await?;

        let total = total_price(listing.room.price_per_night, request.check_in, request.check_out)?;
        if request.guests == 0 {
            return Err(BookingError::InvalidGuestCount);
        }

        let booking = Booking {
            id: BookingId::new(),
            room_id: listing.room.id,
            hotel_id: listing.hotel.id,
            user_id: guest.user_id,
            check_in_date: request.check_in,
            check_out_date: request.check_out,
            guests: request.guests,
            total_price: total,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            created_at: self.clock.now(),
        };

        if let Err(e) = self.store.insert(&booking).await {
            let err = BookingError::from(e);
            if matches!(err, BookingError::RoomUnavailable) {
                metrics::counter!("quickstay_bookings_total", "outcome" => "conflict").increment(1);
                tracing::info!("Lost booking race; room taken by a concurrent request");
            }
            return Err(err);
        }

        metrics::counter!("quickstay_bookings_total", "outcome" => "created").increment(1);
        tracing::info!(booking_id = %booking.id, total = %booking.total_price, "Booking created");

        self.send_confirmation(&booking, &listing, guest);

        Ok(booking)
    }

    /// Start a hosted checkout for `booking_id` and return its URL.
    ///
    /// `origin` is the browser origin the checkout page redirects back to.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] if the booking or its room is gone
    /// - [`BookingError::AlreadyPaid`] if the booking is paid
    /// - [`BookingError::InvalidAmount`] if the total is zero
    /// - [`BookingError::Gateway`] if the gateway fails; the booking stays
    ///   `unpaid` and the call can be retried
    #[tracing::instrument(skip(self))]
    pub async fn request_payment_session(
        &self,
        booking_id: BookingId,
        origin: &str,
    ) -> Result<String, BookingError> {
        let booking = self
            .store
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Booking", booking_id))?;

        if booking.is_paid() {
            return Err(BookingError::AlreadyPaid(booking.id));
        }
        if booking.total_price.is_zero() {
            return Err(BookingError::InvalidAmount);
        }

        let listing = self.listing(booking.room_id).await?;

        let origin = origin.trim_end_matches('/');
        let request = CheckoutRequest::for_booking(
            &booking,
            &listing.hotel.name,
            &listing.room.room_type,
            format!("{origin}{SUCCESS_PATH}"),
            format!("{origin}{CANCEL_PATH}"),
        );

        let session = self.gateway.create_checkout_session(&request).await.map_err(|e| {
            metrics::counter!("quickstay_checkout_sessions_total", "outcome" => "failed").increment(1);
            tracing::error!(error = %e, "Checkout session creation failed");
            e
        })?;

        metrics::counter!("quickstay_checkout_sessions_total", "outcome" => "created").increment(1);

        session
            .url
            .ok_or_else(|| BookingError::Gateway(GatewayError::MissingCheckoutUrl(session.id)))
    }

    /// Bookings made by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the store fails.
    pub async fn list_user_bookings(&self, user: UserId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_by_user(user).await?)
    }

    /// Bookings and revenue of the hotel owned by `owner`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] if `owner` has no hotel
    /// - [`BookingError::InvalidAmount`] if revenue overflows
    /// - [`BookingError::Storage`] if the store fails
    pub async fn hotel_dashboard(&self, owner: UserId) -> Result<HotelDashboard, BookingError> {
        let hotel = self
            .catalog
            .hotel_owned_by(owner)
            .await?
            .ok_or_else(|| BookingError::not_found("Hotel", owner))?;

        let bookings = self.store.list_by_hotel(hotel.id).await?;
        let total_revenue = bookings
            .iter()
            .try_fold(Money::ZERO, |sum, booking| sum.checked_add(booking.total_price))
            .ok_or(BookingError::InvalidAmount)?;

        Ok(HotelDashboard {
            total_bookings: bookings.len(),
            total_revenue,
            bookings,
        })
    }

    async fn listing(&self, room: RoomId) -> Result<RoomListing, BookingError> {
        self.catalog
            .room_listing(room)
            .await?
            .ok_or_else(|| BookingError::not_found("Room", room))
    }

    fn send_confirmation(&self, booking: &Booking, listing: &RoomListing, guest: &Guest) {
        let notice = BookingNotice {
            recipient_email: guest.email.clone(),
            recipient_name: guest.name.clone(),
            booking_id: booking.id,
            hotel_name: listing.hotel.name.clone(),
            hotel_address: listing.hotel.address.clone(),
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            total_price: booking.total_price,
        };
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            match notifier.booking_confirmed(&notice).await {
                Ok(()) => tracing::debug!(booking_id = %notice.booking_id, "Confirmation sent"),
                Err(e) => {
                    metrics::counter!("quickstay_notifications_failed_total").increment(1);
                    tracing::warn!(booking_id = %notice.booking_id, error = %e, "Confirmation not sent");
                },
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quickstay_testing::fixtures::{date, listing};
    use quickstay_testing::{
        test_clock, InMemoryBookingStore, InMemoryRoomCatalog, MockPaymentGateway,
        RecordingNotifier,
    };
    use std::time::Duration;

    struct Harness {
        service: BookingService,
        store: Arc<InMemoryBookingStore>,
        gateway: Arc<MockPaymentGateway>,
        notifier: Arc<RecordingNotifier>,
        listing: RoomListing,
    }

    fn harness(notifier: RecordingNotifier) -> Harness {
        let listing = listing(100);
        let store = Arc::new(InMemoryBookingStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let notifier = Arc::new(notifier);
        let service = BookingService::new(
            store.clone(),
            Arc::new(InMemoryRoomCatalog::new([listing.clone()])),
            gateway.clone(),
            notifier.clone(),
            Arc::new(test_clock()),
        );
        Harness {
            service,
            store,
            gateway,
            notifier,
            listing,
        }
    }

    fn guest() -> Guest {
        Guest {
            user_id: UserId::new(),
            email: "guest@example.com".to_string(),
            name: "Guest".to_string(),
        }
    }

    fn stay(room: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> NewBooking {
        NewBooking {
            room,
            check_in,
            check_out,
            guests: 2,
        }
    }

    #[tokio::test]
    async fn test_create_booking_prices_and_notifies() {
        let h = harness(RecordingNotifier::new());

        let booking = h
            .service
            .create_booking(stay(h.listing.room.id, date(2024, 1, 1), date(2024, 1, 4)), &guest())
            .await
            .unwrap();

        assert_eq!(booking.total_price, Money::from_cents(30_000));
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.hotel_id, h.listing.hotel.id);

        let sent = h.notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].booking_id, booking.id);
        assert_eq!(sent[0].hotel_name, h.listing.hotel.name);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let h = harness(RecordingNotifier::failing());

        let result = h
            .service
            .create_booking(stay(h.listing.room.id, date(2024, 1, 1), date(2024, 1, 2)), &guest())
            .await;

        assert!(result.is_ok());
        assert_eq!(h.notifier.wait_for(1, Duration::from_secs(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejections() {
        let h = harness(RecordingNotifier::new());
        let room = h.listing.room.id;

        assert!(matches!(
            h.service.create_booking(stay(RoomId::new(), date(2024, 1, 1), date(2024, 1, 2)), &guest()).await,
            Err(BookingError::NotFound { resource: "Room", .. })
        ));
        assert!(matches!(
            h.service.create_booking(stay(room, date(2024, 1, 2), date(2024, 1, 2)), &guest()).await,
            Err(BookingError::InvalidDateRange)
        ));
        let mut no_guests = stay(room, date(2024, 1, 1), date(2024, 1, 2));
        no_guests.guests = 0;
        assert!(matches!(
            h.service.create_booking(no_guests, &guest()).await,
            Err(BookingError::InvalidGuestCount)
        ));
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_payment_session_urls_and_amount() {
        let h = harness(RecordingNotifier::new());
        let booking = h
            .service
            .create_booking(stay(h.listing.room.id, date(2024, 1, 1), date(2024, 1, 4)), &guest())
            .await
            .unwrap();

        let url = h
            .service
            .request_payment_session(booking.id, "https://quickstay.example/")
            .await
            .unwrap();

        assert_eq!(url, "https://checkout.test/pay/cs_test_1");
        let checkouts = h.gateway.checkouts().await;
        assert_eq!(checkouts.len(), 1);
        assert_eq!(checkouts[0].amount, Money::from_cents(30_000));
        assert_eq!(checkouts[0].product_name, "Urbanza Suites - Double Bed");
        assert_eq!(checkouts[0].success_url, "https://quickstay.example/loader/my-bookings");
        assert_eq!(checkouts[0].cancel_url, "https://quickstay.example/my-bookings");
    }

    #[tokio::test]
    async fn test_payment_session_failures() {
        let h = harness(RecordingNotifier::new());

        assert!(matches!(
            h.service.request_payment_session(BookingId::new(), "https://a").await,
            Err(BookingError::NotFound { resource: "Booking", .. })
        ));

        let booking = h
            .service
            .create_booking(stay(h.listing.room.id, date(2024, 1, 1), date(2024, 1, 2)), &guest())
            .await
            .unwrap();

        h.gateway.set_failing(true);
        assert!(matches!(
            h.service.request_payment_session(booking.id, "https://a").await,
            Err(BookingError::Gateway(_))
        ));
        assert_eq!(h.store.all().await[0].payment_status, PaymentStatus::Unpaid);

        h.gateway.set_failing(false);
        assert!(h.service.request_payment_session(booking.id, "https://a").await.is_ok());

        h.store.mark_paid(booking.id, "gateway").await.unwrap();
        assert!(matches!(
            h.service.request_payment_session(booking.id, "https://a").await,
            Err(BookingError::AlreadyPaid(id)) if id == booking.id
        ));
    }

    #[tokio::test]
    async fn test_dashboard_sums_hotel_bookings() {
        let h = harness(RecordingNotifier::new());
        let room = h.listing.room.id;
        h.service
            .create_booking(stay(room, date(2024, 1, 1), date(2024, 1, 3)), &guest())
            .await
            .unwrap();
        h.service
            .create_booking(stay(room, date(2024, 2, 1), date(2024, 2, 2)), &guest())
            .await
            .unwrap();

        let dashboard = h.service.hotel_dashboard(h.listing.hotel.owner).await.unwrap();
        assert_eq!(dashboard.total_bookings, 2);
        assert_eq!(dashboard.total_revenue, Money::from_cents(30_000));

        assert!(matches!(
            h.service.hotel_dashboard(UserId::new()).await,
            Err(BookingError::NotFound { resource: "Hotel", .. })
        ));
    }
}
