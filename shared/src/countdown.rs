//! Whole-minute countdown between two wall-clock timestamps.

use chrono::{Local, NaiveDateTime};

/// Minutes from `now` until `event_start`, truncated toward zero.
///
/// Negative deltas truncate toward zero as well, so an event that started
/// 30 seconds ago still reports `0` and one that started 90 seconds ago
/// reports `-1`.
pub fn countdown_minutes(now: NaiveDateTime, event_start: NaiveDateTime) -> i64 {
    (event_start - now).num_seconds() / 60
}

/// Source of the timestamp captured at the start of every pass.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time without timezone information.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
