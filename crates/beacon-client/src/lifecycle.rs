use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Client lifecycle. `Disabled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Disabled,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Host visibility as reported through `on_visibility_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Rolls an unfinished init back to Uninitialized when dropped, so a
/// cancelled `init` future does not leave the client stuck in Initializing.
pub(crate) struct InitGuard<'a> {
    lifecycle: &'a Lifecycle,
    armed: bool,
}

impl<'a> InitGuard<'a> {
    pub(crate) fn new(lifecycle: &'a Lifecycle) -> Self {
        Self {
            lifecycle,
            armed: true,
        }
    }

    /// The init is past its last suspension point.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.lifecycle.abort_init() {
            tracing::warn!(
                event = "init_cancelled",
                "beacon: init dropped before the config arrived, state rolled back"
            );
        }
    }
}

/// Lifecycle state behind a lock, with the guarded transitions.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: Mutex<LifecycleState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    pub(crate) fn get(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Uninitialized -> Initializing. On refusal, returns the current state.
    pub(crate) fn begin_init(&self) -> Result<(), LifecycleState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            LifecycleState::Uninitialized => {
                *state = LifecycleState::Initializing;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Initializing -> Uninitialized, for an init that never finished.
    /// Returns whether the rollback happened.
    pub(crate) fn abort_init(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == LifecycleState::Initializing {
            *state = LifecycleState::Uninitialized;
            true
        } else {
            false
        }
    }

    /// Initializing -> Ready or Disabled.
    pub(crate) fn finish_init(&self, enabled: bool) -> LifecycleState {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == LifecycleState::Initializing {
            *state = if enabled {
                LifecycleState::Ready
            } else {
                LifecycleState::Disabled
            };
        }
        *state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_accepted_once() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.begin_init(), Ok(()));
        assert_eq!(lifecycle.begin_init(), Err(LifecycleState::Initializing));
        assert_eq!(lifecycle.finish_init(true), LifecycleState::Ready);
        assert_eq!(lifecycle.begin_init(), Err(LifecycleState::Ready));
    }

    #[test]
    fn aborted_init_can_be_retried() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_init().unwrap();
        assert!(lifecycle.abort_init());
        assert_eq!(lifecycle.get(), LifecycleState::Uninitialized);
        assert_eq!(lifecycle.begin_init(), Ok(()));
        assert_eq!(lifecycle.finish_init(true), LifecycleState::Ready);
        assert!(!lifecycle.abort_init());
        assert_eq!(lifecycle.get(), LifecycleState::Ready);
    }

    #[test]
    fn disabled_is_terminal() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_init().unwrap();
        assert_eq!(lifecycle.finish_init(false), LifecycleState::Disabled);
        assert_eq!(lifecycle.finish_init(true), LifecycleState::Disabled);
        assert_eq!(lifecycle.begin_init(), Err(LifecycleState::Disabled));
    }
}
