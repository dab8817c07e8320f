//! Daily trigger for the pipeline.
//!
//! The scheduler sleeps until the next occurrence of a fixed local time,
//! runs the pipeline to completion, logs the outcome, and repeats. A failed
//! run never stops the loop.

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use std::time::Duration;

/// Default run time, local: early morning, after the day's coverage settles.
pub const DEFAULT_RUN_AT: &str = "03:00";

/// Time remaining from `now` until the next occurrence of `at`.
///
/// If `at` has already passed today, the next occurrence is tomorrow.
pub fn time_until_next(at: NaiveTime, now: NaiveDateTime) -> Duration {
    let mut target = now.date().and_time(at);
    if target <= now {
        target += ChronoDuration::days(1);
    }
    (target - now).to_std().unwrap_or_default()
}

/// Parse an `HH:MM` run-time argument.
pub fn parse_run_at(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| format!("invalid run time {raw:?} (expected HH:MM): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn on(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_run_later_today() {
        let wait = time_until_next(at(3, 0), on(1, 0, 0));
        assert_eq!(wait, Duration::from_secs(2 * 3600));
    }

    #[test]
    fn test_run_tomorrow_when_time_passed() {
        let wait = time_until_next(at(3, 0), on(4, 0, 0));
        assert_eq!(wait, Duration::from_secs(23 * 3600));
    }

    #[test]
    fn test_exact_boundary_waits_a_full_day() {
        let wait = time_until_next(at(3, 0), on(3, 0, 0));
        assert_eq!(wait, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_parse_run_at() {
        assert_eq!(parse_run_at("03:00").unwrap(), at(3, 0));
        assert_eq!(parse_run_at(" 16:45 ").unwrap(), at(16, 45));
        assert!(parse_run_at("3 am").is_err());
        assert!(parse_run_at("25:00").is_err());
    }
}
