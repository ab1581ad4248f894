//! Shared batch deadline and cancellation signal

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Stand-in expiry for budgets too large to represent as an instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Wall-clock budget shared by every worker of a batch.
///
/// Cloning is cheap; clones observe the same expiry and the same cancel
/// flag. Workers check it before calling a backend. Backends that want to
/// stop early watch [`Deadline::expired`] themselves, nothing is pre-empted.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    cancel: Arc<watch::Sender<bool>>,
}

/// Returned by [`Deadline::guard`] when the deadline fires first
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

impl Deadline {
    /// Deadline expiring `budget` from now. Budgets past the clock's range
    /// saturate to a far-future expiry.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        Self::at(now.checked_add(budget).unwrap_or(now + FAR_FUTURE))
    }

    /// Deadline expiring at a fixed instant
    pub fn at(expires_at: Instant) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            expires_at,
            cancel: Arc::new(cancel),
        }
    }

    /// When the deadline fires
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry, zero once expired or cancelled
    pub fn remaining(&self) -> Duration {
        if self.is_cancelled() {
            return Duration::ZERO;
        }
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Cancel the batch ahead of the deadline
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether [`Deadline::cancel`] has been called
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Whether the deadline has elapsed or been cancelled
    pub fn is_expired(&self) -> bool {
        self.is_cancelled() || Instant::now() >= self.expires_at
    }

    /// Resolves once the deadline elapses or is cancelled
    pub async fn expired(&self) {
        let mut cancelled = self.cancel.subscribe();
        tokio::select! {
            _ = tokio::time::sleep_until(self.expires_at) => {}
            _ = async {
                let _ = cancelled.wait_for(|c| *c).await;
            } => {}
        }
    }

    /// Run `fut` unless the deadline fires first
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        if self.is_expired() {
            return Err(DeadlineExceeded);
        }
        tokio::select! {
            output = fut => Ok(output),
            _ = self.expired() => Err(DeadlineExceeded),
        }
    }
}
