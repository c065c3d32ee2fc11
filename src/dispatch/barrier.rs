//! Completion barrier shared by every task of a dispatched batch
//!
//! Each task owns a [`CompletionGuard`]; the count is decremented in `Drop`,
//! so it is released on success, failure, panic and abort alike.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Counter of outstanding tasks plus a wake-up for waiters
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    remaining: AtomicUsize,
    released: AtomicUsize,
    notify: Notify,
}

impl CompletionBarrier {
    /// Create an empty barrier
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more outstanding task
    ///
    /// Must be called before the task is spawned so the count never
    /// reaches zero while tasks are still being launched.
    pub fn register(self: &Arc<Self>) -> CompletionGuard {
        self.remaining.fetch_add(1, Ordering::AcqRel);
        CompletionGuard {
            barrier: Arc::clone(self),
        }
    }

    /// Number of tasks that have not released their guard yet
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Number of guards released so far
    pub fn released(&self) -> usize {
        self.released.load(Ordering::Acquire)
    }

    /// Wait until every registered guard has been released
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking, or a release in between is lost
            notified.as_mut().enable();

            if self.remaining() == 0 {
                return;
            }

            notified.await;
        }
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::AcqRel);
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }
}

/// Handle owned by one task; releases its slot exactly once when dropped
#[derive(Debug)]
#[must_use = "dropping the guard releases the task's slot immediately"]
pub struct CompletionGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.barrier.release();
    }
}
