//! Wall-clock helpers.
//!
//! All persisted timestamps are unix epoch milliseconds. Operations that
//! need ordering guarantees (duplication, trash bookkeeping) take the
//! current time once and thread it through, rather than sampling the
//! clock repeatedly.

use chrono::Utc;

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Current unix time in milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A timestamp guaranteed to differ from `prev`: `now` when the clock
/// has advanced past it, otherwise one past `prev`.
#[must_use]
pub const fn bump_past(now: i64, prev: i64) -> i64 {
    if now > prev { now } else { prev + 1 }
}

#[cfg(test)]
mod tests {
    use super::{bump_past, now_ms};

    #[test]
    fn bump_always_moves_forward() {
        assert_eq!(bump_past(10, 5), 10);
        assert_eq!(bump_past(5, 5), 6);
        assert_eq!(bump_past(3, 5), 6);
    }

    #[test]
    fn now_is_plausible() {
        // 2020-01-01 in ms; anything earlier means a broken clock source.
        assert!(now_ms() > 1_577_836_800_000);
    }
}
