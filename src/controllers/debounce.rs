//! Delay-and-coalesce timer shared by the controllers

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Pending {
    version: u64,
    handle: Option<JoinHandle<()>>,
}

/// Runs only the last callback scheduled within `delay`.
///
/// Each [`schedule`](Self::schedule) aborts the outstanding timer task and
/// bumps a version; a timer that already woke up checks the version before
/// firing, so a superseded callback never runs. Must be used from within a
/// Tokio runtime.
pub struct DebounceScheduler {
    delay: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Cancels any pending callback and arms a new timer
    pub fn schedule<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
        pending.version = pending.version.wrapping_add(1);
        let version = pending.version;

        let shared = Arc::clone(&self.pending);
        let delay = self.delay;
        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = lock(&shared);
                if pending.version != version {
                    return;
                }
                pending.handle = None;
            }
            callback();
        }));
    }

    /// Drops the pending callback, if any. Idempotent.
    pub fn cancel(&self) {
        let mut pending = lock(&self.pending);
        pending.version = pending.version.wrapping_add(1);
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).handle.is_some()
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
