//! In-app referrer tracking.
//!
//! A document referrer does not change on in-app navigation, so the client
//! remembers the previous path itself. An override stands in for the next
//! navigation's referrer when content is shown without a path change, such
//! as an overlay.

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ReferrerState {
    last_path: Option<String>,
    referrer: Option<String>,
    pending_override: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReferrerTracker {
    state: Mutex<ReferrerState>,
}

impl ReferrerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a navigation to `path`. The referrer becomes the pending
    /// override if one is set, else the previous path. Empty paths are ignored.
    pub fn update_on_navigation(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        let mut state = self.lock();
        let referrer = state
            .pending_override
            .take()
            .or_else(|| state.last_path.clone());
        state.referrer = referrer;
        state.last_path = Some(path.to_string());
    }

    /// Use `path` as the referrer of the next navigation.
    pub fn set_override(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        self.lock().pending_override = Some(path.to_string());
    }

    pub fn clear_override(&self) {
        self.lock().pending_override = None;
    }

    /// The in-app referrer, if any navigation has produced one.
    pub fn referrer(&self) -> Option<String> {
        self.lock().referrer.clone().filter(|r| !r.is_empty())
    }

    pub fn current_path(&self) -> Option<String> {
        self.lock().last_path.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ReferrerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
