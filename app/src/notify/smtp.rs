//! SMTP notifier using Lettre.

use super::{render_confirmation, CONFIRMATION_SUBJECT};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use quickstay_core::{BookingNotice, NotifyError, Notifier};

/// Sends booking confirmations through an SMTP relay.
///
/// # Examples
///
/// ```ignore
/// let notifier = SmtpNotifier::new(
///     "smtp-relay.brevo.com",
///     587,
///     "user",
///     "password",
///     "QuickStay <bookings@example.com>",
///     "$",
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpNotifier {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from: Mailbox,
    currency_symbol: String,
}

impl SmtpNotifier {
    /// Create an SMTP notifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidAddress`] if `from` is not a mailbox.
    pub fn new(
        smtp_server: impl Into<String>,
        smtp_port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        from: &str,
        currency_symbol: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("sender {from}: {e}")))?;

        Ok(Self {
            smtp_server: smtp_server.into(),
            smtp_port,
            credentials: Credentials::new(username.into(), password.into()),
            from,
            currency_symbol: currency_symbol.into(),
        })
    }

    /// A new transport per message; no pooled connections to go stale.
    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp_server)
            .map_err(|e| NotifyError::Delivery(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn build_message(&self, notice: &BookingNotice) -> Result<Message, NotifyError> {
        let to = notice
            .recipient_email
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("recipient: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(CONFIRMATION_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_confirmation(notice, &self.currency_symbol))
            .map_err(|e| NotifyError::Delivery(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn booking_confirmed(&self, notice: &BookingNotice) -> Result<(), NotifyError> {
        let email = self.build_message(notice)?;
        let mailer = self.build_transport()?;

        mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(format!("Failed to send email: {e}")))
    }
}
