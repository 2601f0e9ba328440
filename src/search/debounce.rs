//! Trailing-edge debouncing on the Tokio runtime

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Holds at most one deferred task; scheduling a new one aborts the previous.
///
/// Dropping the debouncer aborts whatever is still pending.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` passes without another call to `schedule` or `cancel`.
    ///
    /// Returns `false` without running anything when `delay` is zero or no
    /// Tokio runtime is available; the caller should then run the work itself.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        if delay.is_zero() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            debug!("No Tokio runtime available, running debounced work inline");
            return false;
        };

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        *self.pending.lock() = Some(handle);
        true
    }

    /// Abort the pending task, if any. Returns whether one was aborted.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                debug!("Cancelled pending debounced task");
                true
            }
            _ => false,
        }
    }

    /// Whether a task is scheduled and has not finished yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
