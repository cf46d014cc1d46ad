//! Single-deadline inactivity timer.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A pending deadline and the task waiting for it.
#[derive(Debug)]
struct PendingDeadline {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Holds at most one pending inactivity deadline.
///
/// Scheduling always cancels the previous deadline first. Every scheduled
/// deadline carries a generation number; the expiry action receives it and
/// must call [`InactivityTimer::complete`] before acting, which rejects any
/// deadline that was cancelled or superseded after its task woke up.
#[derive(Debug)]
pub struct InactivityTimer {
    timeout: Duration,
    generation: u64,
    pending: Option<PendingDeadline>,
}

impl InactivityTimer {
    /// Create an idle timer with the given inactivity period.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            generation: 0,
            pending: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one `timeout` from
    /// now. `on_expire` runs on `runtime` with the deadline's generation.
    pub fn schedule<F, Fut>(&mut self, runtime: &Handle, on_expire: F) -> Instant
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let deadline = Instant::now() + self.timeout;

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_expire(generation).await;
        });

        self.pending = Some(PendingDeadline {
            generation,
            deadline,
            task,
        });
        deadline
    }

    /// Cancel the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.abort();
                true
            }
            None => false,
        }
    }

    /// Claim the deadline of `generation` from inside its own expiry task.
    ///
    /// Returns `false` when that deadline is no longer the pending one.
    /// On success the deadline is cleared without aborting the task, so the
    /// caller can finish its expiry work.
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Whether `generation` is the pending deadline.
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.generation == generation)
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
