use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_client::Beacon;
use beacon_core::config::BeaconConfig;
use beacon_core::errors::BeaconResult;
use beacon_core::traits::{IKeyValueStore, SendOutcome};
use beacon_storage::{FileStore, MemoryStore};
use beacon_test_fixtures::ScriptedTransport;
use serde_json::{json, Map};

type TestBeacon = Beacon<Arc<ScriptedTransport>>;

async fn ready(transport: ScriptedTransport) -> (TestBeacon, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let beacon = Beacon::new(
        BeaconConfig::default(),
        Arc::new(MemoryStore::new()),
        transport.clone(),
    );
    beacon.init().await;
    (beacon, transport)
}

fn track_n(beacon: &TestBeacon, n: usize) {
    for i in 0..n {
        beacon.track(&format!("e{i}"), json!({ "i": i }), Map::new());
    }
}

// ─── Batching ──────────────────────────────────────────────

#[tokio::test]
async fn flush_delivers_everything_in_order_in_bounded_batches() {
    let (beacon, transport) = ready(ScriptedTransport::always_ok()).await;
    track_n(&beacon, 45);

    beacon.flush().await;

    assert_eq!(beacon.queue_len(), 0);
    let sizes: Vec<_> = transport.calls().iter().map(|c| c.events.len()).collect();
    assert_eq!(sizes, vec![20, 20, 6]);

    let names: Vec<_> = transport.delivered_events().into_iter().map(|e| e.event).collect();
    let mut expected = vec!["session_start".to_string()];
    expected.extend((0..45).map(|i| format!("e{i}")));
    assert_eq!(names, expected);
}

#[tokio::test]
async fn empty_queue_makes_no_network_calls() {
    let (beacon, transport) = ready(ScriptedTransport::always_ok()).await;
    beacon.flush().await;
    let after_first = transport.call_count();
    assert_eq!(after_first, 1);

    beacon.flush().await;
    beacon.flush().await;
    assert_eq!(transport.call_count(), after_first);
}

#[tokio::test(start_paused = true)]
async fn reaching_batch_size_flushes_in_the_background() {
    let (beacon, transport) = ready(ScriptedTransport::always_ok()).await;
    track_n(&beacon, 18);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.call_count(), 0);

    // session_start plus 19 events reaches the threshold.
    track_n(&beacon, 1);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.call_count(), 1);
    assert_eq!(beacon.queue_len(), 0);
}

// ─── Concurrency ───────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn concurrent_flushes_never_send_an_event_twice() {
    let (beacon, transport) =
        ready(ScriptedTransport::always_ok().with_latency(Duration::from_millis(200))).await;
    track_n(&beacon, 50);

    let other = beacon.clone();
    let third = beacon.clone();
    tokio::join!(beacon.flush(), other.flush(), third.flush());

    let delivered = transport.delivered_events();
    let unique: HashSet<_> = delivered.iter().map(|e| e.event_id).collect();
    assert_eq!(delivered.len(), 51);
    assert_eq!(unique.len(), 51);
    assert_eq!(beacon.queue_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn events_tracked_during_a_flush_are_kept() {
    let (beacon, transport) =
        ready(ScriptedTransport::always_ok().with_latency(Duration::from_secs(1))).await;

    let background = beacon.clone();
    let flush = tokio::spawn(async move { background.flush().await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(transport.call_count(), 1);

    beacon.track("while_in_flight", json!({}), Map::new());
    flush.await.unwrap();

    let names: Vec<_> = transport.delivered_events().into_iter().map(|e| e.event).collect();
    assert_eq!(names, vec!["session_start", "while_in_flight"]);
    assert_eq!(beacon.queue_len(), 0);
}

// ─── Failures ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn given_up_batch_stays_queued_for_the_next_flush() {
    let (beacon, transport) = ready(ScriptedTransport::scripted([
        SendOutcome::ServerError { status: 502 },
        SendOutcome::ServerError { status: 502 },
        SendOutcome::NetworkError { reason: "offline".into() },
        SendOutcome::ServerError { status: 502 },
    ]))
    .await;
    track_n(&beacon, 2);

    beacon.flush().await;
    assert_eq!(transport.call_count(), 4);
    assert_eq!(beacon.queue_len(), 3);
    let stats = beacon.stats();
    assert_eq!(stats.batches_given_up, 1);
    assert_eq!(stats.retries, 3);
    assert_eq!(stats.events_delivered, 0);

    beacon.flush().await;
    assert_eq!(beacon.queue_len(), 0);
    assert_eq!(beacon.stats().events_delivered, 3);
}

#[tokio::test(start_paused = true)]
async fn give_up_stops_the_flush_without_touching_later_batches() {
    let (beacon, transport) =
        ready(ScriptedTransport::always(SendOutcome::NetworkError { reason: "offline".into() }))
            .await;
    track_n(&beacon, 30);
    beacon.flush().await;

    let first_batch = transport.calls()[0].event_ids();
    assert!(transport.calls().iter().all(|c| c.event_ids() == first_batch));
    assert_eq!(beacon.queue_len(), 31);
}

#[tokio::test(start_paused = true)]
async fn client_error_drops_the_batch_without_delay() {
    let (beacon, transport) =
        ready(ScriptedTransport::scripted([SendOutcome::ClientError { status: 400 }])).await;
    track_n(&beacon, 24);
    let start = tokio::time::Instant::now();

    beacon.flush().await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(beacon.queue_len(), 0);
    assert_eq!(transport.delivered_events().len(), 5);
    let stats = beacon.stats();
    assert_eq!(stats.events_dropped, 20);
    assert_eq!(stats.events_delivered, 5);
    assert_eq!(stats.retries, 0);
}

#[tokio::test]
async fn stats_count_enqueues_and_flushes() {
    let (beacon, _) = ready(ScriptedTransport::always_ok()).await;
    track_n(&beacon, 3);
    beacon.flush().await;
    beacon.flush().await;

    let stats = beacon.stats();
    assert_eq!(stats.events_enqueued, 4);
    assert_eq!(stats.events_delivered, 4);
    assert_eq!(stats.flushes, 1);
}

// ─── Persistence ───────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn queued_events_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beacon-state.json");

    let offline = Arc::new(ScriptedTransport::always(SendOutcome::NetworkError {
        reason: "offline".into(),
    }));
    let first = Beacon::new(
        BeaconConfig::default(),
        Arc::new(FileStore::open(&path).unwrap()),
        offline.clone(),
    );
    first.init().await;
    first.identify("user-9");
    track_n(&first, 3);
    first.shutdown().await;
    assert_eq!(first.queue_len(), 4);
    let anonymous_id = offline.calls()[0].events[0].anonymous_id.clone();
    drop(first);

    let online = Arc::new(ScriptedTransport::always_ok());
    let second = Beacon::new(
        BeaconConfig::default(),
        Arc::new(FileStore::open(&path).unwrap()),
        online.clone(),
    );
    second.init().await;
    second.flush().await;

    let delivered = online.delivered_events();
    assert_eq!(delivered.len(), 5);
    assert!(delivered.iter().all(|e| e.anonymous_id == anonymous_id));
    assert_eq!(delivered[1].user_id.as_deref(), Some("user-9"));
    assert_eq!(second.queue_len(), 0);
}

// ─── Blocking storage ──────────────────────────────────────

/// Store whose writes, once armed, block their thread until released.
#[derive(Default)]
struct GatedStore {
    inner: MemoryStore,
    armed: AtomicBool,
    entered: AtomicBool,
    released: AtomicBool,
    timed_out: AtomicBool,
}

impl GatedStore {
    fn wait_for_release(&self) {
        if !self.armed.load(Ordering::SeqCst) {
            return;
        }
        self.entered.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.released.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                self.timed_out.store(true, Ordering::SeqCst);
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl IKeyValueStore for GatedStore {
    fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        self.wait_for_release();
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> BeaconResult<()> {
        self.wait_for_release();
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn slow_storage_writes_do_not_block_the_runtime() {
    let store = Arc::new(GatedStore::default());
    let transport = Arc::new(ScriptedTransport::always_ok());
    let beacon = Beacon::new(BeaconConfig::default(), store.clone(), transport.clone());
    beacon.init().await;
    track_n(&beacon, 3);
    store.armed.store(true, Ordering::SeqCst);

    let flushing = tokio::spawn({
        let beacon = beacon.clone();
        async move { beacon.flush().await }
    });

    // This task keeps running while the flush is parked inside a store write.
    while !store.entered.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
    store.released.store(true, Ordering::SeqCst);
    flushing.await.unwrap();

    assert!(!store.timed_out.load(Ordering::SeqCst));
    assert_eq!(transport.delivered_events().len(), 4);
    assert_eq!(beacon.queue_len(), 0);
}
