//! Test doubles for the Beacon workspace: a scripted transport that records
//! every call, a manually advanced clock, a store with injectable failures,
//! and event builders.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use beacon_core::errors::{BeaconResult, StorageError, TransportError};
use beacon_core::models::{AppInfo, Event, EventContext, EventIdentity, RemoteConfig};
use beacon_core::traits::{IClock, IKeyValueStore, ITransport, SendOutcome};
use chrono::Utc;
use serde_json::Map;
use tokio::time::Instant;
use uuid::Uuid;

// ─── Events ────────────────────────────────────────────────

pub fn app_info() -> AppInfo {
    AppInfo {
        platform: "web".into(),
        app: "meridian".into(),
        app_version: "0.1.0".into(),
        build: "1".into(),
        env: "test".into(),
    }
}

/// An event with fixed identity fields and no properties.
pub fn sample_event(name: &str) -> Event {
    Event::new(
        name,
        Utc::now(),
        EventIdentity {
            anonymous_id: "anon-fixture".into(),
            user_id: None,
            session_id: "session-fixture".into(),
        },
        app_info(),
        EventContext::new("en-US", "UTC"),
        Map::new(),
    )
}

/// `n` events named `event-0` .. `event-{n-1}`.
pub fn sample_events(n: usize) -> Vec<Event> {
    (0..n).map(|i| sample_event(&format!("event-{i}"))).collect()
}

// ─── Clock ─────────────────────────────────────────────────

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn at_now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set_ms(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl IClock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

// ─── Storage ───────────────────────────────────────────────

/// Key-value store whose reads and writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct FailingStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store where every operation fails, like storage in a locked-down browser.
    pub fn broken() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Raw write, bypassing failure injection.
    pub fn poke(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl IKeyValueStore for FailingStore {
    fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: "injected read failure".into(),
            }
            .into());
        }
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "injected write failure".into(),
            }
            .into());
        }
        self.poke(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> BeaconResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "injected write failure".into(),
            }
            .into());
        }
        self.entries.lock().unwrap().remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ─── Transport ─────────────────────────────────────────────

/// One `send_batch` call as seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub events: Vec<Event>,
    /// Tokio time at which the call started; virtual under a paused clock.
    pub at: Instant,
}

impl RecordedCall {
    pub fn event_ids(&self) -> Vec<Uuid> {
        self.events.iter().map(|e| e.event_id).collect()
    }
}

/// What `fetch_config` answers.
#[derive(Debug, Clone, Copy)]
pub enum ConfigReply {
    Config(RemoteConfig),
    /// The collector answered without usable data.
    Empty,
    /// The request failed.
    Fail,
}

/// Transport that replays a scripted list of outcomes, then a fallback.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<SendOutcome>>,
    fallback: SendOutcome,
    latency: Duration,
    config_latency: Duration,
    config: Mutex<ConfigReply>,
    calls: Mutex<Vec<RecordedCall>>,
    delivered: Mutex<Vec<Event>>,
    config_calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Every send succeeds.
    pub fn always_ok() -> Self {
        Self::with_fallback(SendOutcome::Delivered { status: 200 })
    }

    /// Every send fails with `outcome`.
    pub fn always(outcome: SendOutcome) -> Self {
        Self::with_fallback(outcome)
    }

    /// Replay `outcomes` in order, then succeed.
    pub fn scripted(outcomes: impl IntoIterator<Item = SendOutcome>) -> Self {
        let transport = Self::always_ok();
        transport.script.lock().unwrap().extend(outcomes);
        transport
    }

    fn with_fallback(fallback: SendOutcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            latency: Duration::ZERO,
            config_latency: Duration::ZERO,
            config: Mutex::new(ConfigReply::Config(RemoteConfig::default())),
            calls: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
            config_calls: AtomicUsize::new(0),
        }
    }

    /// Each send takes `latency` (tokio time) before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Each `fetch_config` takes `latency` (tokio time) before answering.
    pub fn with_config_latency(mut self, latency: Duration) -> Self {
        self.config_latency = latency;
        self
    }

    pub fn with_config(self, reply: ConfigReply) -> Self {
        *self.config.lock().unwrap() = reply;
        self
    }

    pub fn push_outcome(&self, outcome: SendOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn config_call_count(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    /// Every event from every call, in call order. Includes failed attempts.
    pub fn sent_events(&self) -> Vec<Event> {
        self.calls()
            .into_iter()
            .flat_map(|c| c.events)
            .collect()
    }

    /// Events from calls that were answered with a 2xx.
    pub fn delivered_events(&self) -> Vec<Event> {
        self.delivered.lock().unwrap().clone()
    }
}

impl ITransport for ScriptedTransport {
    async fn send_batch(&self, events: &[Event]) -> SendOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            events: events.to_vec(),
            at: Instant::now(),
        });
        let next = self.script.lock().unwrap().pop_front();
        let outcome = next.unwrap_or_else(|| self.fallback.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if outcome.is_delivered() {
            self.delivered.lock().unwrap().extend_from_slice(events);
        }
        outcome
    }

    async fn fetch_config(&self) -> BeaconResult<Option<RemoteConfig>> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        if !self.config_latency.is_zero() {
            tokio::time::sleep(self.config_latency).await;
        }
        let reply = *self.config.lock().unwrap();
        match reply {
            ConfigReply::Config(cfg) => Ok(Some(cfg)),
            ConfigReply::Empty => Ok(None),
            ConfigReply::Fail => Err(TransportError::NetworkError {
                reason: "injected config failure".into(),
            }
            .into()),
        }
    }
}
