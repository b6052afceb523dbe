//! Periodic flush timer.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use beacon_core::constants::MAX_FLUSH_INTERVAL_MS;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owns the background task that ticks every `period`. The first tick fires
/// one full period after start. Periods are clamped to
/// `[1 ms, MAX_FLUSH_INTERVAL_MS]`. Dropping the scheduler stops the task.
#[derive(Debug, Default)]
pub struct FlushScheduler {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FlushScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking, replacing any running timer. Each tick calls `on_tick`;
    /// the future it returns runs as its own task, so stopping the timer never
    /// cancels work already started. Returning `None` stops the timer.
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Option<Fut> + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.clamp(
            Duration::from_millis(1),
            Duration::from_millis(MAX_FLUSH_INTERVAL_MS),
        );
        let handle = tokio::spawn(async move {
            let now = Instant::now();
            let first = now.checked_add(period).unwrap_or(now);
            let mut ticker = tokio::time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match on_tick() {
                    Some(work) => {
                        tokio::spawn(work);
                    }
                    None => break,
                }
            }
            tracing::debug!(event = "scheduler_stopped", "scheduler: owner gone, timer stopped");
        });

        let previous = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop the timer. Work spawned by earlier ticks runs to completion.
    pub fn stop(&self) {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
