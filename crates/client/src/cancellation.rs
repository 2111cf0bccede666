//! Cooperative cancellation for search polling.
//!
//! Responsibilities:
//! - Provide a clonable token that callers hand to a [`crate::SearchPoller`]
//!   and trigger from anywhere (signal handler, another task, UI).
//! - Let sleeping pollers wake up as soon as cancellation is requested.
//!
//! Does NOT handle:
//! - Aborting in-flight HTTP requests. The poller only observes the token at
//!   iteration boundaries and while waiting between polls.
//! - Installing signal handlers (see the CLI crate).
//!
//! Invariants:
//! - Once cancelled, a token remains cancelled forever.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;

/// Cancellation token usable across async tasks.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel token (idempotent).
    pub fn cancel(&self) {
        let was_cancelled = self.cancelled.swap(true, Ordering::SeqCst);
        if !was_cancelled {
            self.notify.notify_waiters();
        }
    }

    /// True if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Await cancellation.
    ///
    /// The `notified()` future is created before the flag is checked so a
    /// concurrent `cancel()` cannot be missed.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
