//! Beacon: the client handle the host application talks to.
//!
//! Every public method absorbs its own failures: storage and network problems
//! are logged and recovered from, never returned, and nothing here panics on
//! the host's behalf.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use beacon_core::config::BeaconConfig;
use beacon_core::constants::{ADMIN_ROLE, EVENT_SCREEN_VIEW, EVENT_SESSION_START};
use beacon_core::errors::BeaconResult;
use beacon_core::models::{AppInfo, Event, EventContext, Properties, RemoteConfig};
use beacon_core::traits::{IClock, IKeyValueStore, IScrubber, ITransport, SystemClock};
use beacon_observability::{events as log, DeliveryStats, DeliveryStatsSnapshot};
use beacon_privacy::PiiScrubber;
use beacon_session::IdentityManager;
use beacon_storage::{open_store, DurableQueue};
use beacon_transport::{BatchOutcome, BatchSender, HttpTransport, RetryPolicy};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::lifecycle::{InitGuard, Lifecycle, LifecycleState, Visibility};
use crate::referrer::ReferrerTracker;
use crate::scheduler::FlushScheduler;

/// Cloneable handle to one telemetry client. Clones share all state.
pub struct Beacon<T: ITransport> {
    inner: Arc<Inner<T>>,
}

impl<T: ITransport> Clone for Beacon<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T: ITransport> {
    app: AppInfo,
    locale: String,
    timezone: String,
    document_referrer: Option<String>,
    batch_size: usize,
    flush_interval: Duration,

    clock: Arc<dyn IClock>,
    identity: IdentityManager,
    queue: Arc<DurableQueue>,
    scrubber: PiiScrubber,
    sender: BatchSender<T>,
    referrer: ReferrerTracker,

    lifecycle: Lifecycle,
    remote: Mutex<RemoteConfig>,
    roles: Mutex<Option<Vec<String>>>,
    visibility: Mutex<Visibility>,

    /// Held for the whole of a flush; serializes flushes per client.
    flush_gate: tokio::sync::Mutex<()>,
    scheduler: FlushScheduler,
    stats: DeliveryStats,
}

impl Beacon<HttpTransport> {
    /// Validate `config`, open the configured store, and talk HTTP to the
    /// configured collector.
    pub fn from_config(config: BeaconConfig) -> BeaconResult<Self> {
        config.validate()?;
        let store = open_store(&config.storage);
        let transport = HttpTransport::new(&config.transport)?;
        Ok(Self::new(config, store, transport))
    }
}

impl<T: ITransport> Beacon<T> {
    pub fn new(config: BeaconConfig, store: Arc<dyn IKeyValueStore>, transport: T) -> Self {
        Self::with_clock(config, store, transport, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: BeaconConfig,
        store: Arc<dyn IKeyValueStore>,
        transport: T,
        clock: Arc<dyn IClock>,
    ) -> Self {
        let client = &config.client;
        let app = AppInfo {
            platform: client.platform.clone(),
            app: client.app.clone(),
            app_version: client.app_version.clone(),
            build: client.build.clone(),
            env: client.env.clone(),
        };

        let inner = Inner {
            app,
            locale: client.resolved_locale(),
            timezone: client.resolved_timezone(),
            document_referrer: client
                .document_referrer
                .clone()
                .filter(|r| !r.is_empty()),
            batch_size: config.scheduler.max_batch_size.max(1),
            flush_interval: Duration::from_secs(config.scheduler.flush_interval_secs),
            identity: IdentityManager::with_timeout(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.scheduler.session_timeout_ms(),
            ),
            clock,
            queue: Arc::new(DurableQueue::with_capacity(
                store,
                config.storage.max_queue_size,
            )),
            scrubber: PiiScrubber::from_config(&config.privacy),
            sender: BatchSender::new(transport, RetryPolicy::from_config(&config.transport)),
            referrer: ReferrerTracker::new(),
            lifecycle: Lifecycle::new(),
            remote: Mutex::new(RemoteConfig::default()),
            roles: Mutex::new(None),
            visibility: Mutex::new(Visibility::Visible),
            flush_gate: tokio::sync::Mutex::new(()),
            scheduler: FlushScheduler::new(),
            stats: DeliveryStats::new(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ─── Lifecycle ─────────────────────────────────────────

    /// Fetch the remote config and start the client.
    ///
    /// Only the first completed call does anything; dropping the future while
    /// the config is being fetched leaves the client uninitialized, so `init`
    /// can be called again. A failed or unusable config fetch
    /// falls back to the permissive defaults. A config that disables tracking
    /// leaves the client permanently disabled.
    pub async fn init(&self) {
        if let Err(state) = self.inner.lifecycle.begin_init() {
            tracing::warn!(event = "init_ignored", %state, "beacon: already initialized");
            return;
        }
        let guard = InitGuard::new(&self.inner.lifecycle);

        let remote = match self.inner.sender.transport().fetch_config().await {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                log::config_fallback("response carried no usable config");
                RemoteConfig::default()
            }
            Err(e) => {
                log::config_fallback(&e.to_string());
                RemoteConfig::default()
            }
        };
        guard.disarm();
        *lock(&self.inner.remote) = remote;

        if !remote.enabled {
            self.inner.lifecycle.finish_init(false);
            tracing::info!(event = "tracking_disabled", "beacon: disabled by remote config");
            return;
        }

        self.start_scheduler();
        self.inner.lifecycle.finish_init(true);
        self.track(EVENT_SESSION_START, Value::Null, Map::new());
        tracing::info!(
            event = "initialized",
            app = %self.inner.app.app,
            env = %self.inner.app.env,
            exclude_admin_users = remote.exclude_admin_users_from_tracking,
            "beacon: initialized"
        );
    }

    /// Stop the periodic timer and deliver what is queued.
    pub async fn shutdown(&self) {
        self.inner.scheduler.stop();
        self.inner.flush().await;
        let pending = self.inner.with_queue(|queue| queue.len()).await.unwrap_or(0);
        tracing::info!(
            event = "shutdown",
            pending,
            "beacon: shut down"
        );
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.get()
    }

    /// False once a remote config has disabled tracking.
    pub fn is_enabled(&self) -> bool {
        self.state() != LifecycleState::Disabled
    }

    /// The remote config in effect. Permissive defaults until `init` completes.
    pub fn remote_config(&self) -> RemoteConfig {
        *lock(&self.inner.remote)
    }

    // ─── Identity ──────────────────────────────────────────

    pub fn identify(&self, user_id: &str) {
        if !self.is_enabled() {
            return;
        }
        self.inner.identity.identify(user_id);
    }

    /// Replace the cached roles used for admin exclusion. Never flushes.
    pub fn set_user_roles<I, S>(&self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.inner.roles) = Some(roles.into_iter().map(Into::into).collect());
    }

    pub fn clear_user_roles(&self) {
        *lock(&self.inner.roles) = None;
    }

    /// Forget the user, the roles, and the session. The anonymous id stays.
    pub fn reset(&self) {
        self.clear_user_roles();
        if !self.is_enabled() {
            return;
        }
        self.inner.identity.reset();
    }

    // ─── Tracking ──────────────────────────────────────────

    /// Record an event.
    ///
    /// `properties` is scrubbed of PII; anything but an object becomes `{}`.
    /// `context_overrides` is merged over the ambient context. Calls before
    /// `init` completes, after tracking was disabled, or from an excluded
    /// admin user are ignored.
    pub fn track(&self, name: &str, properties: Value, context_overrides: Properties) {
        let inner = &self.inner;
        match inner.lifecycle.get() {
            LifecycleState::Ready => {}
            LifecycleState::Disabled => return log::tracking_skipped(name, "disabled"),
            state => {
                tracing::warn!(event_name = %name, %state, "beacon: track called before init");
                return log::tracking_skipped(name, "not initialized");
            }
        }
        if name.trim().is_empty() {
            tracing::warn!("beacon: event name must not be empty");
            return log::tracking_skipped(name, "empty event name");
        }
        if inner.is_role_excluded() {
            return log::tracking_skipped(name, "admin excluded");
        }

        let event = inner.build_event(name, &properties, context_overrides);
        let queue_len = inner.queue.enqueue(event);
        inner.stats.record_enqueued();
        log::event_queued(name, queue_len);

        if queue_len >= inner.batch_size {
            self.spawn_flush();
        }
    }

    /// Record a `screen_view` for `name`.
    pub fn screen(&self, name: &str, properties: Value) {
        let mut context = Map::new();
        context.insert("screen".to_string(), Value::String(name.to_string()));
        self.track(EVENT_SCREEN_VIEW, properties, context);
    }

    /// Deliver everything queued. Waits for any flush already in progress,
    /// then drains what it left. No network calls on an empty queue.
    pub async fn flush(&self) {
        self.inner.flush().await;
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn stats(&self) -> DeliveryStatsSnapshot {
        self.inner.stats.snapshot()
    }

    // ─── Host hooks ────────────────────────────────────────

    /// Report a visibility change. Becoming hidden flushes. Becoming visible
    /// again re-checks the session and flushes.
    pub fn on_visibility_change(&self, visibility: Visibility) -> Option<JoinHandle<()>> {
        let previous = std::mem::replace(&mut *lock(&self.inner.visibility), visibility);
        if self.state() != LifecycleState::Ready {
            return None;
        }
        match (previous, visibility) {
            (Visibility::Hidden, Visibility::Visible) => {
                self.inner.identity.touch_session();
                self.spawn_flush()
            }
            (_, Visibility::Hidden) => self.spawn_flush(),
            _ => None,
        }
    }

    /// The host is about to go away. Starts a flush the host may await.
    pub fn on_before_unload(&self) -> Option<JoinHandle<()>> {
        if self.state() != LifecycleState::Ready {
            return None;
        }
        self.spawn_flush()
    }

    // ─── Referrer ──────────────────────────────────────────

    /// Record in-app navigation to `path`.
    pub fn navigate(&self, path: &str) {
        self.inner.referrer.update_on_navigation(path);
    }

    pub fn set_referrer_override(&self, path: &str) {
        self.inner.referrer.set_override(path);
    }

    pub fn clear_referrer_override(&self) {
        self.inner.referrer.clear_override();
    }

    // ─── Internals ─────────────────────────────────────────

    fn start_scheduler(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .start(self.inner.flush_interval, move || {
                let inner = weak.upgrade()?;
                Some(async move { inner.flush().await })
            });
    }

    /// Flush in the background if a runtime is available.
    fn spawn_flush(&self) -> Option<JoinHandle<()>> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                Some(handle.spawn(async move { inner.flush().await }))
            }
            Err(_) => {
                tracing::debug!("beacon: no async runtime, flush left to the next trigger");
                None
            }
        }
    }
}

impl<T: ITransport> Inner<T> {
    fn is_role_excluded(&self) -> bool {
        if !lock(&self.remote).exclude_admin_users_from_tracking {
            return false;
        }
        lock(&self.roles)
            .as_ref()
            .is_some_and(|roles| roles.iter().any(|r| r == ADMIN_ROLE))
    }

    fn build_event(&self, name: &str, properties: &Value, overrides: Properties) -> Event {
        let referrer = self
            .referrer
            .referrer()
            .or_else(|| self.document_referrer.clone());
        let context = EventContext::new(self.locale.clone(), self.timezone.clone())
            .with_referrer(referrer)
            .with_overrides(overrides);
        Event::new(
            name,
            self.clock.now(),
            self.identity.identity(),
            self.app.clone(),
            context,
            self.scrubber.scrub(properties),
        )
    }

    /// Send queued events in FIFO batches until the queue is drained or a
    /// batch gives up. Events leave the queue only once their batch is
    /// settled, re-read by id so events queued meanwhile are kept.
    async fn flush(&self) {
        if self.lifecycle.get() != LifecycleState::Ready {
            return;
        }
        let _gate = self.flush_gate.lock().await;

        // Ids settled by this flush. If storage could not forget them they
        // are skipped here and resent by a later flush.
        let mut settled: HashSet<Uuid> = HashSet::new();
        let mut counted = false;
        loop {
            let Some(queued) = self.with_queue(|queue| queue.read_all()).await else {
                break;
            };
            let batch: Vec<Event> = queued
                .into_iter()
                .filter(|e| !settled.contains(&e.event_id))
                .take(self.batch_size)
                .collect();
            if batch.is_empty() {
                break;
            }
            if !counted {
                self.stats.record_flush();
                counted = true;
            }

            let outcome = self.sender.send(&batch).await;
            self.stats.record_retries(outcome.retries());
            match outcome {
                BatchOutcome::Delivered { .. } => self.stats.record_delivered(batch.len()),
                BatchOutcome::Dropped { .. } => self.stats.record_dropped(batch.len()),
                BatchOutcome::GaveUp { .. } => {
                    self.stats.record_given_up();
                    break;
                }
            }

            let ids: Vec<Uuid> = batch.iter().map(|e| e.event_id).collect();
            settled.extend(ids.iter().copied());
            self.with_queue(move |queue| queue.remove_delivered(&ids)).await;
        }
    }

    /// Run queue I/O on the blocking pool. Backend writes are synchronous and
    /// a file-backed store rewrites its whole state file per call.
    async fn with_queue<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&DurableQueue) -> R + Send + 'static,
        R: Send + 'static,
    {
        let queue = Arc::clone(&self.queue);
        match tokio::task::spawn_blocking(move || f(&queue)).await {
            Ok(result) => Some(result),
            Err(e) => {
                log::storage_degraded("queue", "blocking_io", &e.to_string());
                None
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
