//! Blue-green rollout gates.
//!
//! Both gates are pure functions of timestamps and recompute from scratch
//! on every call. Elapsed time is truncated to whole seconds before it is
//! compared with the threshold.

use chrono::{DateTime, Utc};
use rollgate_model::{Condition, ConditionType, Event};
use tracing::debug;

use crate::events::latest_event;

fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_seconds()
}

/// True once the instance has been `Available` for `threshold_secs`.
pub fn initial_delay_elapsed(condition: Option<&Condition>, threshold_secs: i32) -> bool {
    initial_delay_elapsed_at(condition, threshold_secs, Utc::now())
}

/// [`initial_delay_elapsed`] against an explicit clock.
///
/// A missing condition, or one of another type, never passes.
pub fn initial_delay_elapsed_at(
    condition: Option<&Condition>,
    threshold_secs: i32,
    now: DateTime<Utc>,
) -> bool {
    let Some(condition) = condition else {
        return false;
    };
    if condition.condition_type != ConditionType::Available {
        return false;
    }

    let elapsed = elapsed_secs(condition.last_transition_time, now);
    let passed = elapsed >= i64::from(threshold_secs);
    debug!(elapsed, threshold_secs, passed, "Initial delay gate");
    passed
}

/// True once `threshold_secs` have passed since the most recent eviction.
pub fn takeover_wait_elapsed(events: &[Event], threshold_secs: i32) -> bool {
    takeover_wait_elapsed_at(events, threshold_secs, Utc::now())
}

/// [`takeover_wait_elapsed`] against an explicit clock.
///
/// With no evictions there is nothing to wait for.
pub fn takeover_wait_elapsed_at(events: &[Event], threshold_secs: i32, now: DateTime<Utc>) -> bool {
    let Some(last) = latest_event(events) else {
        return true;
    };

    let elapsed = elapsed_secs(last.last_timestamp, now);
    let passed = elapsed >= i64::from(threshold_secs);
    debug!(
        event = %last.metadata.name,
        elapsed,
        threshold_secs,
        passed,
        "Takeover wait gate"
    );
    passed
}
