//! Failed-attempt throttling with escalating lockouts.
//!
//! Every portal client is tracked under a weak fingerprint key. Five
//! consecutive failures trigger a lockout, and each lockout cycle escalates
//! through a fixed ladder (5 minutes, 10 minutes, 24 hours) without ever
//! advancing past the last stage. A short fixed rate limit spaces attempts
//! independently of lockouts.
//!
//! Transitions are pure functions over [`ThrottleState`]; persistence lives
//! behind the [`store::ThrottleStore`] port and is orchestrated by
//! [`service::Throttle`]. This is damage limitation for a login form, not a
//! hard security boundary: a client that changes its fingerprint starts
//! from a clean slate.

use serde::{Deserialize, Serialize};

pub mod fingerprint;
pub mod service;
pub mod store;

pub use fingerprint::fingerprint;
pub use service::Throttle;
pub use store::{FileStore, MemoryStore, ThrottleStore};

/// Consecutive failures allowed before a lockout triggers.
pub const MAX_ATTEMPTS: u32 = 5;

/// Minimum spacing between attempts, in milliseconds.
pub const RATE_LIMIT_MS: i64 = 2000;

/// Escalating lockout durations. Repeated lockout cycles stay pinned to the
/// last stage.
pub const LOCKOUT_STAGES: [Stage; 3] = [
    Stage::minutes(5),
    Stage::minutes(10),
    Stage::hours(24),
];

/// One rung of the lockout ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    pub duration: i64,
    pub unit: Unit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Minutes,
    Hours,
}

impl Stage {
    const fn minutes(duration: i64) -> Self {
        Self {
            duration,
            unit: Unit::Minutes,
        }
    }

    const fn hours(duration: i64) -> Self {
        Self {
            duration,
            unit: Unit::Hours,
        }
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        match self.unit {
            Unit::Minutes => self.duration * 60_000,
            Unit::Hours => self.duration * 3_600_000,
        }
    }
}

/// Per-client throttle state, persisted as one JSON blob per fingerprint.
///
/// Timestamps are epoch milliseconds. `attempts` counts consecutive
/// failures since the last reset; `lockout_level` indexes
/// [`LOCKOUT_STAGES`] and never decreases within an unlocked-to-locked
/// cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleState {
    pub attempts: u32,
    pub lockout_level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockout_until: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<i64>,
}

/// Outcome of gating a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Deny(Denial),
}

/// User-facing denial with the remaining wait, rounded up the way the
/// portal page displays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Account locked. Try again in {remaining_minutes} minutes")]
    Locked { remaining_minutes: i64 },
    #[error("Please wait {remaining_seconds} seconds...")]
    RateLimited { remaining_seconds: i64 },
}

impl Denial {
    /// Seconds until the client may retry, for the `Retry-After` header.
    #[must_use]
    pub const fn retry_after_seconds(self) -> i64 {
        match self {
            Self::Locked { remaining_minutes } => remaining_minutes * 60,
            Self::RateLimited { remaining_seconds } => remaining_seconds,
        }
    }
}

/// Decide whether an attempt may proceed at `now_ms`.
///
/// An expired lockout is cleared here: the returned state is zeroed and the
/// attempt allowed. Callers must persist the returned state whenever it
/// differs from the input.
#[must_use]
pub fn evaluate_gate(state: ThrottleState, now_ms: i64) -> (ThrottleState, Gate) {
    if let Some(until) = state.lockout_until {
        if now_ms < until {
            let remaining_minutes = div_ceil(until - now_ms, 60_000);
            return (state, Gate::Deny(Denial::Locked { remaining_minutes }));
        }
        // Lockout expired: back to zero values, attempt allowed.
        return (ThrottleState::default(), Gate::Allow);
    }

    if let Some(last) = state.last_attempt {
        let elapsed = now_ms - last;
        if (0..RATE_LIMIT_MS).contains(&elapsed) {
            let remaining_seconds = div_ceil(RATE_LIMIT_MS - elapsed, 1000);
            return (state, Gate::Deny(Denial::RateLimited { remaining_seconds }));
        }
    }

    (state, Gate::Allow)
}

/// Record a failed attempt at `now_ms`.
///
/// The fifth consecutive failure escalates: the level moves to
/// `min(level + 1, last stage)`, the lockout deadline is set from that
/// stage, and the attempt counter resets.
#[must_use]
pub fn record_failure(state: ThrottleState, now_ms: i64) -> ThrottleState {
    let mut next = state;
    next.attempts += 1;
    next.last_attempt = Some(now_ms);

    if next.attempts >= MAX_ATTEMPTS {
        let level = (state.lockout_level + 1).min(LOCKOUT_STAGES.len() - 1);
        next.lockout_level = level;
        next.lockout_until = Some(now_ms + LOCKOUT_STAGES[level].as_millis());
        next.attempts = 0;
    }

    next
}

/// Record a successful login: everything back to zero values.
#[must_use]
pub fn record_success(_state: ThrottleState) -> ThrottleState {
    ThrottleState::default()
}

const fn div_ceil(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn failure_below_threshold_increments_only() {
        let mut state = ThrottleState::default();
        for expected in 1..MAX_ATTEMPTS {
            state = record_failure(state, NOW);
            assert_eq!(state.attempts, expected);
            assert_eq!(state.lockout_until, None);
            assert_eq!(state.last_attempt, Some(NOW));
        }
    }

    #[test]
    fn fifth_failure_locks_on_second_stage() {
        let mut state = ThrottleState::default();
        for _ in 0..MAX_ATTEMPTS {
            state = record_failure(state, NOW);
        }
        // min(0 + 1, 2) = 1, i.e. the 10-minute stage.
        assert_eq!(state.attempts, 0);
        assert_eq!(state.lockout_level, 1);
        assert_eq!(
            state.lockout_until,
            Some(NOW + LOCKOUT_STAGES[1].as_millis())
        );
    }

    #[test]
    fn escalation_pins_to_last_stage() {
        let mut state = ThrottleState::default();
        let mut now = NOW;
        for cycle in 0..6 {
            for _ in 0..MAX_ATTEMPTS {
                state = record_failure(state, now);
            }
            let expected_level = (cycle + 1).min(LOCKOUT_STAGES.len() - 1);
            assert_eq!(state.lockout_level, expected_level);
            assert_eq!(
                state.lockout_until,
                Some(now + LOCKOUT_STAGES[expected_level].as_millis())
            );
            // Lockout level carries across cycles even though the gate
            // resets the rest on expiry in the real flow.
            now = state.lockout_until.unwrap();
            state.lockout_until = None;
            state.last_attempt = None;
        }
        assert_eq!(state.lockout_level, LOCKOUT_STAGES.len() - 1);
    }

    #[test]
    fn gate_denies_until_the_last_millisecond() {
        let state = ThrottleState {
            lockout_until: Some(NOW + 60_000),
            ..ThrottleState::default()
        };

        let (unchanged, gate) = evaluate_gate(state, NOW + 59_999);
        assert_eq!(unchanged, state);
        assert_eq!(
            gate,
            Gate::Deny(Denial::Locked {
                remaining_minutes: 1
            })
        );
    }

    #[test]
    fn gate_resets_at_expiry_instant() {
        let state = ThrottleState {
            attempts: 2,
            lockout_level: 2,
            lockout_until: Some(NOW),
            last_attempt: Some(NOW - 10),
        };

        let (next, gate) = evaluate_gate(state, NOW);
        assert_eq!(gate, Gate::Allow);
        assert_eq!(next, ThrottleState::default());
    }

    #[test]
    fn lockout_message_rounds_minutes_up() {
        let state = ThrottleState {
            lockout_until: Some(NOW + 61_000),
            ..ThrottleState::default()
        };

        let (_, gate) = evaluate_gate(state, NOW);
        let Gate::Deny(denial) = gate else {
            panic!("expected denial");
        };
        assert_eq!(
            denial.to_string(),
            "Account locked. Try again in 2 minutes"
        );
        assert_eq!(denial.retry_after_seconds(), 120);
    }

    #[test]
    fn rate_limit_denies_inside_the_window() {
        let state = ThrottleState {
            attempts: 1,
            last_attempt: Some(NOW),
            ..ThrottleState::default()
        };

        for elapsed in [0, 1, 1999] {
            let (unchanged, gate) = evaluate_gate(state, NOW + elapsed);
            assert_eq!(unchanged, state);
            assert!(matches!(gate, Gate::Deny(Denial::RateLimited { .. })));
        }

        let (_, gate) = evaluate_gate(state, NOW + RATE_LIMIT_MS);
        assert_eq!(gate, Gate::Allow);
    }

    #[test]
    fn rate_limit_message_rounds_seconds_up() {
        let state = ThrottleState {
            last_attempt: Some(NOW),
            ..ThrottleState::default()
        };

        let (_, gate) = evaluate_gate(state, NOW + 500);
        assert_eq!(
            gate,
            Gate::Deny(Denial::RateLimited {
                remaining_seconds: 2
            })
        );
    }

    #[test]
    fn lockout_outranks_rate_limit() {
        let state = ThrottleState {
            lockout_until: Some(NOW + 300_000),
            last_attempt: Some(NOW - 100),
            ..ThrottleState::default()
        };

        let (_, gate) = evaluate_gate(state, NOW);
        assert!(matches!(gate, Gate::Deny(Denial::Locked { .. })));
    }

    #[test]
    fn success_always_zeroes() {
        let state = ThrottleState {
            attempts: 4,
            lockout_level: 2,
            lockout_until: Some(NOW + 1),
            last_attempt: Some(NOW),
        };
        assert_eq!(record_success(state), ThrottleState::default());
    }

    #[test]
    fn state_round_trips_as_json() {
        let state = ThrottleState {
            attempts: 3,
            lockout_level: 1,
            lockout_until: Some(NOW),
            last_attempt: Some(NOW - 5),
        };
        let blob = serde_json::to_string(&state).unwrap();
        let decoded: ThrottleState = serde_json::from_str(&blob).unwrap();
        assert_eq!(decoded, state);

        // Absent fields deserialize as unset, matching a fresh blob.
        let fresh: ThrottleState = serde_json::from_str("{}").unwrap();
        assert_eq!(fresh, ThrottleState::default());
    }

    #[test]
    fn stage_table_matches_the_documented_ladder() {
        assert_eq!(LOCKOUT_STAGES[0].as_millis(), 5 * 60_000);
        assert_eq!(LOCKOUT_STAGES[1].as_millis(), 10 * 60_000);
        assert_eq!(LOCKOUT_STAGES[2].as_millis(), 24 * 3_600_000);
    }
}
