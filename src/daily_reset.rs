use chrono::{Local, NaiveDate};

use crate::record::SessionRecord;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for the daily reset
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Clears the session counter when the record was last stamped on another
/// day. Returns true when a reset happened.
pub fn apply_daily_reset(record: &mut SessionRecord, clock: &impl Clock) -> bool {
    let today = date_string(clock.today());
    if record.last_date == today {
        return false;
    }
    log::info!(
        "daily reset: last_date={:?} today={} sessions_cleared={}",
        record.last_date,
        today,
        record.sessions_completed
    );
    record.sessions_completed = 0;
    record.last_date = today;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn record(last_date: &str, sessions: u32) -> SessionRecord {
        SessionRecord {
            sessions_completed: sessions,
            last_date: last_date.to_string(),
            ..SessionRecord::default()
        }
    }

    #[test]
    fn different_day_resets_counter() {
        let mut rec = record("2024-01-01", 5);
        assert!(apply_daily_reset(&mut rec, &day(2024, 1, 2)));
        assert_eq!(rec.sessions_completed, 0);
        assert_eq!(rec.last_date, "2024-01-02");
    }

    #[test]
    fn same_day_keeps_counter() {
        let mut rec = record("2024-01-01", 5);
        assert!(!apply_daily_reset(&mut rec, &day(2024, 1, 1)));
        assert_eq!(rec.sessions_completed, 5);
        assert_eq!(rec.last_date, "2024-01-01");
    }

    #[test]
    fn empty_date_is_stamped() {
        let mut rec = record("", 0);
        assert!(apply_daily_reset(&mut rec, &day(2025, 12, 31)));
        assert_eq!(rec.last_date, "2025-12-31");
    }

    #[test]
    fn reset_only_touches_counter_and_date() {
        let mut rec = record("2024-01-01", 2);
        rec.notes_content = "keep me".into();
        apply_daily_reset(&mut rec, &day(2024, 3, 9));
        assert_eq!(rec.notes_content, "keep me");
    }

    #[test]
    fn date_string_is_zero_padded() {
        assert_eq!(date_string(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), "2024-03-09");
    }
}
