//! Retry timing runs on tokio's paused clock, so the recorded call instants
//! show the exact backoff without real sleeps.

use std::time::Duration;

use beacon_core::traits::SendOutcome;
use beacon_test_fixtures::{sample_events, ScriptedTransport};
use beacon_transport::{BatchOutcome, BatchSender, RetryPolicy};

fn server_error() -> SendOutcome {
    SendOutcome::ServerError { status: 503 }
}

fn network_error() -> SendOutcome {
    SendOutcome::NetworkError {
        reason: "connection refused".into(),
    }
}

fn gaps(transport: &ScriptedTransport) -> Vec<Duration> {
    transport
        .calls()
        .windows(2)
        .map(|pair| pair[1].at.duration_since(pair[0].at))
        .collect()
}

fn assert_gaps(actual: &[Duration], expected_ms: &[u64]) {
    assert_eq!(actual.len(), expected_ms.len(), "gaps: {actual:?}");
    for (gap, ms) in actual.iter().zip(expected_ms) {
        let expected = Duration::from_millis(*ms);
        assert!(
            *gap >= expected && *gap < expected + Duration::from_millis(5),
            "gap {gap:?} != {expected:?}"
        );
    }
}

// ─── Retry and backoff ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_waits_one_then_two_seconds() {
    let sender = BatchSender::new(
        ScriptedTransport::scripted([server_error(), network_error()]),
        RetryPolicy::default(),
    );
    let batch = sample_events(3);

    let outcome = sender.send(&batch).await;

    assert_eq!(outcome, BatchOutcome::Delivered { attempts: 3 });
    assert_eq!(outcome.retries(), 2);
    assert_eq!(sender.transport().call_count(), 3);
    assert_gaps(&gaps(sender.transport()), &[1_000, 2_000]);
}

#[tokio::test(start_paused = true)]
async fn client_error_is_dropped_without_delay() {
    let sender = BatchSender::new(
        ScriptedTransport::always(SendOutcome::ClientError { status: 400 }),
        RetryPolicy::default(),
    );
    let start = tokio::time::Instant::now();

    let outcome = sender.send(&sample_events(2)).await;

    assert_eq!(outcome, BatchOutcome::Dropped { status: 400, attempts: 1 });
    assert!(outcome.is_success());
    assert_eq!(sender.transport().call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_give_up_after_four_calls() {
    let sender = BatchSender::new(ScriptedTransport::always(server_error()), RetryPolicy::default());

    let outcome = sender.send(&sample_events(1)).await;

    assert!(matches!(outcome, BatchOutcome::GaveUp { attempts: 4, ref reason } if reason == "HTTP 503"));
    assert!(!outcome.is_success());
    assert_gaps(&gaps(sender.transport()), &[1_000, 2_000, 4_000]);
}

#[tokio::test(start_paused = true)]
async fn send_from_resumes_partway_through_the_table() {
    let sender = BatchSender::new(ScriptedTransport::always(network_error()), RetryPolicy::default());

    let outcome = sender.send_from(&sample_events(1), 2).await;

    assert_eq!(outcome.attempts(), 2);
    assert_gaps(&gaps(sender.transport()), &[4_000]);
}

#[tokio::test(start_paused = true)]
async fn short_table_repeats_its_last_delay() {
    let sender = BatchSender::new(
        ScriptedTransport::always(server_error()),
        RetryPolicy::new(3, &[100]),
    );

    sender.send(&sample_events(1)).await;

    assert_gaps(&gaps(sender.transport()), &[100, 100, 100]);
}

#[tokio::test(start_paused = true)]
async fn zero_retry_budget_makes_one_call() {
    let sender = BatchSender::new(ScriptedTransport::always(server_error()), RetryPolicy::new(0, &[1_000]));
    let outcome = sender.send(&sample_events(1)).await;
    assert_eq!(outcome.attempts(), 1);
    assert!(!outcome.is_success());
}

#[tokio::test(start_paused = true)]
async fn unusual_status_is_not_retried() {
    let sender = BatchSender::new(
        ScriptedTransport::always(SendOutcome::from_status(304)),
        RetryPolicy::default(),
    );
    let outcome = sender.send(&sample_events(1)).await;
    assert_eq!(outcome, BatchOutcome::Dropped { status: 304, attempts: 1 });
}

#[tokio::test]
async fn every_attempt_carries_the_same_batch() {
    let sender = BatchSender::new(
        ScriptedTransport::scripted([server_error()]),
        RetryPolicy::new(3, &[1]),
    );
    let batch = sample_events(4);
    sender.send(&batch).await;

    let calls = sender.transport().calls();
    let expected: Vec<_> = batch.iter().map(|e| e.event_id).collect();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.event_ids() == expected));
    assert_eq!(sender.transport().delivered_events().len(), 4);
}
