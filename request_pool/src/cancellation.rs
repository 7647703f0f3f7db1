use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;

/// The controlling half of a cancellation pair. Hand out tokens with
/// [`CancellationSource::token`] and flip them all with
/// [`CancellationSource::cancel`].
///
/// Dropping the source does **not** cancel outstanding tokens; an
/// in-flight batch keeps running until it is explicitly superseded.
#[derive(Debug)]
pub struct CancellationSource {
    inner: Arc<CancellationInner>,
}

/// The observing half of a cancellation pair: cheap to clone, shared by
/// everything participating in one batch of work.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationInner>,
}

#[derive(Debug)]
struct CancellationInner {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
    notify: Notify,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationInner {
                cancelled: AtomicBool::new(false),
                reason: Mutex::new(None),
                notify: Notify::new(),
            }),
        }
    }

    /// A token observing this source's state.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Signal cancellation. Idempotent; the first reason wins. Every
    /// pending [`CancellationToken::cancelled`] future is woken.
    pub fn cancel(&self, reason: &str) {
        {
            let mut stored = self
                .inner
                .reason
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if self.inner.cancelled.load(Ordering::Acquire) {
                return;
            }

            *stored = Some(reason.to_owned());
            self.inner.cancelled.store(true, Ordering::Release);
        }

        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// The reason passed to the first [`CancellationSource::cancel`] call,
    /// if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.inner
            .reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Completes once cancellation is signalled. Returns immediately when
    /// the token is already cancelled.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);

        // Register for the wake-up before checking the flag, so a cancel
        // landing between the check and the await cannot be missed.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }

        notified.await;
    }
}
