//! Duration helpers
//!
//! Session idle timeouts are expressed in whole minutes by the owning
//! service, while the waiter works in `Duration`. These helpers keep the
//! conversion in one place.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Build a `Duration` from whole minutes
pub fn minutes(n: u32) -> Duration {
    Duration::from_secs(u64::from(n) * 60)
}

/// Whole minutes in a duration, rounding down
pub fn as_minutes(d: Duration) -> u64 {
    d.as_secs() / 60
}

/// Time left until a wall-clock deadline given as milliseconds since the
/// Unix epoch. Returns `None` if the deadline is unknown (`0`) and
/// `Some(Duration::ZERO)` if it has already passed.
pub fn remaining_until_epoch_millis(deadline_ms: u64, now: SystemTime) -> Option<Duration> {
    if deadline_ms == 0 {
        return None;
    }
    let deadline = UNIX_EPOCH + Duration::from_millis(deadline_ms);
    Some(deadline.duration_since(now).unwrap_or(Duration::ZERO))
}
