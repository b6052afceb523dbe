//! Structured log events for the delivery pipeline.
//!
//! Each function emits a `tracing` event with structured fields.

/// An event entered the durable queue.
pub fn event_queued(event_name: &str, queue_len: usize) {
    tracing::debug!(
        event = "event_queued",
        event_name = %event_name,
        queue_len = queue_len,
        "event queued"
    );
}

/// The queue was full and its oldest entries were discarded.
pub fn queue_overflow(dropped: usize, capacity: usize) {
    tracing::warn!(
        event = "queue_overflow",
        dropped = dropped,
        capacity = capacity,
        "queue full, oldest events dropped"
    );
}

/// A batch was accepted by the collector.
pub fn batch_delivered(batch_size: usize, attempts: u32) {
    tracing::debug!(
        event = "batch_delivered",
        batch_size = batch_size,
        attempts = attempts,
        "batch delivered"
    );
}

/// The collector rejected a batch with a client error; it will not be resent.
pub fn batch_dropped(batch_size: usize, status: u16) {
    tracing::warn!(
        event = "batch_dropped",
        batch_size = batch_size,
        status = status,
        "batch rejected by collector, dropped"
    );
}

/// A transient failure; the batch is sent again after `delay_ms`.
pub fn retry_scheduled(retry: u32, max_retries: u32, delay_ms: u64, reason: &str) {
    tracing::debug!(
        event = "retry_scheduled",
        retry = retry,
        max_retries = max_retries,
        delay_ms = delay_ms,
        reason = %reason,
        "batch send failed, retrying"
    );
}

/// Retries ran out; the batch stays queued for the next flush.
pub fn batch_given_up(batch_size: usize, attempts: u32) {
    tracing::warn!(
        event = "batch_given_up",
        batch_size = batch_size,
        attempts = attempts,
        "batch send gave up, events stay queued"
    );
}

/// Storage failed and a safe default was used instead.
pub fn storage_degraded(component: &str, operation: &str, error: &str) {
    tracing::warn!(
        event = "storage_degraded",
        component = %component,
        operation = %operation,
        error = %error,
        "storage unavailable, continuing with defaults"
    );
}

/// Remote tracking config could not be used; permissive defaults apply.
pub fn config_fallback(reason: &str) {
    tracing::warn!(
        event = "config_fallback",
        reason = %reason,
        "remote config unavailable, using defaults"
    );
}

/// A tracking call was ignored.
pub fn tracking_skipped(event_name: &str, reason: &str) {
    tracing::debug!(
        event = "tracking_skipped",
        event_name = %event_name,
        reason = %reason,
        "tracking call ignored"
    );
}

/// A new session replaced a stale or missing one.
pub fn session_rotated(previous: Option<&str>, session_id: &str) {
    tracing::info!(
        event = "session_rotated",
        previous = previous.unwrap_or(""),
        session_id = %session_id,
        "session started"
    );
}
