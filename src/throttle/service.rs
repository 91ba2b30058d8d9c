//! Orchestration over the storage port: load, transition, persist.

use super::{evaluate_gate, record_failure, Gate, ThrottleState, ThrottleStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Throttle front door used by the login handler and the expiry sweeper.
///
/// Store failures never block a login: reads fall back to a fresh state and
/// writes are surfaced as warnings, so a broken state directory degrades to
/// an unthrottled portal instead of a dead one.
#[derive(Clone)]
pub struct Throttle {
    store: Arc<dyn ThrottleStore>,
}

impl Throttle {
    #[must_use]
    pub fn new(store: Arc<dyn ThrottleStore>) -> Self {
        Self { store }
    }

    /// Gate an attempt for `key` at `now_ms`, persisting the reset when an
    /// expired lockout is cleared.
    pub fn check(&self, key: &str, now_ms: i64) -> Gate {
        let state = self.load(key);
        let (next, gate) = evaluate_gate(state, now_ms);
        if next != state {
            self.persist(key, next);
        }
        gate
    }

    /// Record a failed attempt and return the persisted state.
    pub fn failure(&self, key: &str, now_ms: i64) -> ThrottleState {
        let next = record_failure(self.load(key), now_ms);
        self.persist(key, next);
        next
    }

    /// Record a successful login by dropping the client's blob entirely.
    pub fn success(&self, key: &str) {
        if let Err(err) = self.store.clear(key) {
            warn!("Failed to clear throttle state for {key}: {err:?}");
        }
    }

    /// Drop blobs whose lockout deadline has passed.
    ///
    /// Attempt counters without a lockout are left alone; only the expiry
    /// reset the gate would perform anyway is applied eagerly. Returns the
    /// number of cleared entries.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!("Throttle sweep could not list state: {err:?}");
                return 0;
            }
        };

        let mut cleared = 0;
        for key in keys {
            let expired = match self.store.load(&key) {
                Ok(Some(state)) => state.lockout_until.is_some_and(|until| now_ms >= until),
                Ok(None) => false,
                Err(err) => {
                    warn!("Throttle sweep could not load {key}: {err:?}");
                    false
                }
            };

            if expired {
                match self.store.clear(&key) {
                    Ok(()) => cleared += 1,
                    Err(err) => warn!("Throttle sweep could not clear {key}: {err:?}"),
                }
            }
        }

        if cleared > 0 {
            debug!("Cleared {cleared} expired lockouts");
        }
        cleared
    }

    fn load(&self, key: &str) -> ThrottleState {
        match self.store.load(key) {
            Ok(state) => state.unwrap_or_default(),
            Err(err) => {
                warn!("Failed to load throttle state for {key}: {err:?}");
                ThrottleState::default()
            }
        }
    }

    fn persist(&self, key: &str, state: ThrottleState) {
        if let Err(err) = self.store.save(key, state) {
            warn!("Failed to persist throttle state for {key}: {err:?}");
        }
    }
}
