//! Background sweep tasks
//!
//! Sweepers run on their own tokio timers and only delete already-expired
//! entries, so they never race destructively with live increments. Each
//! sweeper is owned by a handle with an explicit `shutdown()`; dropping the
//! handle also stops the task.

use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancellation handle for a periodic sweep task
///
/// `shutdown()` is idempotent: the first call aborts the task, subsequent
/// calls are no-ops.
pub struct SweeperHandle {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SweeperHandle {
    /// Spawn a sweep task invoking `sweep` every `interval`
    pub fn spawn<F>(interval: Duration, sweep: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the sweep cadence
            // starts one interval after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep();
            }
        });

        Self {
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stop the sweep task; safe to call more than once
    pub fn shutdown(&self) {
        if let Ok(mut guard) = self.handle.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    /// Whether the task has already been shut down
    pub fn is_shutdown(&self) -> bool {
        self.handle.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
