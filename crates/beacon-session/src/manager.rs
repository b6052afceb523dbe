//! IdentityManager: persisted identity with time-based session rotation.

use std::sync::{Arc, Mutex, MutexGuard};

use beacon_core::constants::SESSION_TIMEOUT_MS;
use beacon_core::errors::BeaconResult;
use beacon_core::models::{EventIdentity, Session};
use beacon_core::traits::{IClock, IKeyValueStore};
use beacon_observability::events;
use beacon_storage::keys;
use uuid::Uuid;

/// Reads and rotates identity state.
///
/// Storage failures are logged and answered with freshly generated values;
/// no method here returns an error.
pub struct IdentityManager {
    store: Arc<dyn IKeyValueStore>,
    clock: Arc<dyn IClock>,
    session_timeout_ms: i64,
    /// Serializes session read-check-rotate so two callers never both rotate.
    guard: Mutex<()>,
}

impl IdentityManager {
    pub fn new(store: Arc<dyn IKeyValueStore>, clock: Arc<dyn IClock>) -> Self {
        Self::with_timeout(store, clock, SESSION_TIMEOUT_MS)
    }

    pub fn with_timeout(
        store: Arc<dyn IKeyValueStore>,
        clock: Arc<dyn IClock>,
        session_timeout_ms: i64,
    ) -> Self {
        Self {
            store,
            clock,
            session_timeout_ms,
            guard: Mutex::new(()),
        }
    }

    pub fn session_timeout_ms(&self) -> i64 {
        self.session_timeout_ms
    }

    /// The persisted anonymous id, created on first use.
    ///
    /// If storage cannot be read or written, a fresh id is returned for this
    /// call only.
    pub fn anonymous_id(&self) -> String {
        match self.store.get(keys::ANONYMOUS_ID) {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                let id = Uuid::new_v4().to_string();
                if let Err(e) = self.store.set(keys::ANONYMOUS_ID, &id) {
                    degraded("anonymous_id_write", &e);
                }
                id
            }
            Err(e) => {
                degraded("anonymous_id_read", &e);
                Uuid::new_v4().to_string()
            }
        }
    }

    /// Current session id, rotating it first if the session has gone stale.
    pub fn session_id(&self) -> String {
        self.current_session().session_id
    }

    /// Current session tuple. Starts or rotates one as needed.
    pub fn current_session(&self) -> Session {
        let _guard = self.lock();
        let now = self.clock.now_ms();
        match self.load_session() {
            Ok(Some((session_id, Some(session_start)))) => {
                let session = Session {
                    session_id,
                    session_start,
                };
                if session.is_expired(now, self.session_timeout_ms) {
                    self.rotate(now, Some(&session))
                } else {
                    session
                }
            }
            Ok(Some((session_id, None))) => {
                let session = Session {
                    session_id,
                    session_start: now,
                };
                self.save_session(&session);
                session
            }
            Ok(None) => self.rotate(now, None),
            Err(e) => {
                degraded("session_read", &e);
                self.rotate(now, None)
            }
        }
    }

    /// Re-evaluate the session when the host becomes visible again.
    ///
    /// A stale session rotates. A live one keeps its id and its start moves
    /// to now.
    pub fn touch_session(&self) -> Session {
        let _guard = self.lock();
        let now = self.clock.now_ms();
        match self.load_session() {
            Ok(Some((session_id, start))) => {
                let previous = Session {
                    session_id,
                    session_start: start.unwrap_or(now),
                };
                if previous.is_expired(now, self.session_timeout_ms) {
                    return self.rotate(now, Some(&previous));
                }
                let refreshed = Session {
                    session_id: previous.session_id,
                    session_start: now,
                };
                self.save_session(&refreshed);
                refreshed
            }
            Ok(None) => self.rotate(now, None),
            Err(e) => {
                degraded("session_read", &e);
                self.rotate(now, None)
            }
        }
    }

    pub fn user_id(&self) -> Option<String> {
        match self.store.get(keys::USER_ID) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                degraded("user_id_read", &e);
                None
            }
        }
    }

    pub fn identify(&self, user_id: &str) {
        if let Err(e) = self.store.set(keys::USER_ID, user_id) {
            degraded("user_id_write", &e);
            return;
        }
        tracing::debug!(event = "identified", "session: user id set");
    }

    /// Forget the user and the session. The anonymous id is kept.
    pub fn reset(&self) {
        let _guard = self.lock();
        for key in [keys::USER_ID, keys::SESSION_ID, keys::SESSION_START] {
            if let Err(e) = self.store.remove(key) {
                degraded("reset", &e);
            }
        }
        tracing::debug!(event = "identity_reset", "session: user and session cleared");
    }

    /// All identity fields for one event.
    pub fn identity(&self) -> EventIdentity {
        EventIdentity {
            anonymous_id: self.anonymous_id(),
            user_id: self.user_id(),
            session_id: self.session_id(),
        }
    }

    /// An id without a start reads as `(id, None)`; a start without an id
    /// reads as no session.
    fn load_session(&self) -> BeaconResult<Option<(String, Option<i64>)>> {
        let Some(session_id) = self
            .store
            .get(keys::SESSION_ID)?
            .filter(|id| !id.is_empty())
        else {
            return Ok(None);
        };
        let start = self
            .store
            .get(keys::SESSION_START)?
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        Ok(Some((session_id, start)))
    }

    fn rotate(&self, now: i64, previous: Option<&Session>) -> Session {
        let session = Session::start(now);
        self.save_session(&session);
        events::session_rotated(previous.map(|s| s.session_id.as_str()), &session.session_id);
        session
    }

    fn save_session(&self, session: &Session) {
        let start = session.session_start.to_string();
        let result = self.store.set_many(&[
            (keys::SESSION_ID, session.session_id.as_str()),
            (keys::SESSION_START, start.as_str()),
        ]);
        if let Err(e) = result {
            degraded("session_write", &e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn degraded(operation: &str, error: &dyn std::fmt::Display) {
    events::storage_degraded("session", operation, &error.to_string());
}
