//! Cooperative cancellation for in-flight layout requests.
//!
//! An [`AbortSource`] is the owning side; [`AbortSignal`]s are cheap clones handed to whatever
//! awaits the outbound call. Aborting is sticky until the source is [`reset`](AbortSource::reset)
//! for the next session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    aborted: AtomicBool,
    notify: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct AbortSource {
    shared: Arc<Shared>,
}

impl AbortSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Requests cancellation and wakes every pending waiter.
    pub fn abort(&self) {
        self.shared.aborted.store(true, Ordering::Release);
        self.shared.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.shared.aborted.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct AbortSignal {
    shared: Arc<Shared>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::Acquire)
    }

    /// Resolves once the source aborts. Resolves immediately if it already has.
    pub async fn aborted(&self) {
        loop {
            // Registered on creation, so an abort between the check and the await is not lost.
            let notified = self.shared.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}
