//! Recording notifier.

use async_trait::async_trait;
use quickstay_core::{BookingNotice, NotifyError, Notifier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// [`Notifier`] that keeps every notice it is asked to send.
///
/// Confirmations are dispatched in the background, so tests wait for them
/// with [`RecordingNotifier::wait_for`].
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<BookingNotice>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that records each attempt and then fails it.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(true),
        }
    }

    /// Notices received so far.
    pub async fn sent(&self) -> Vec<BookingNotice> {
        self.sent.lock().await.clone()
    }

    /// Poll until at least `count` notices arrived or `timeout` elapses.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<BookingNotice> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent().await;
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn booking_confirmed(&self, notice: &BookingNotice) -> Result<(), NotifyError> {
        self.sent.lock().await.push(notice.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".to_string()));
        }
        Ok(())
    }
}
