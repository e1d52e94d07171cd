//! One-shot expiry timer with cancel-then-arm discipline

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Owned handle to the pending expiry callback
///
/// Every arm or cancel bumps the generation. A callback that raced past
/// `abort` carries a stale generation and must be ignored by its receiver.
#[derive(Debug, Default)]
pub(crate) struct ExpiryTimer {
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl ExpiryTimer {
    /// Abort the pending callback, if any, and invalidate its generation
    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Cancel the previous callback, then schedule `on_fire` after `delay`
    pub(crate) fn arm<F>(&mut self, runtime: &Handle, delay: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        self.task = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(generation);
        }));
    }

    /// Claim the firing callback if it is still current
    ///
    /// Releases the handle without aborting, since the caller is the
    /// callback itself.
    pub(crate) fn claim(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.task = None;
        true
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
