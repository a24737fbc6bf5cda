//! Fixed-point calendar difference.
//!
//! This is deliberately **not** exact Gregorian elapsed-day arithmetic: whole
//! months are summed from a fixed table (February is always 28 days) and leap
//! days are added as a running `y/4 + y/400 - y/100` correction. The quirks
//! are relied upon downstream — in particular, the registry's year-1 "never
//! scanned" sentinel must register as 700,000+ days overdue — so the day
//! computation here must not be replaced with a chrono duration.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Days per month with a fixed 28-day February.
const MONTH_DAYS: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day count of the sentinel zero timestamp (0001-01-01T00:00:00Z) under
/// this algorithm: `1*365 + 1` with no month or leap contribution.
const ZERO_DAY_COUNT: i64 = 366;

/// Field-wise difference between two timestamps. Only `days` feeds the
/// decision rules; the clock fields exist because their borrow-down carries
/// into the day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDelta {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Calendar day count since the algorithm's fixed point.
fn day_count(t: DateTime<Utc>) -> i64 {
    let year = t.year() as i64;
    let month = t.month() as usize;

    let mut total = year * 365 + t.day() as i64;
    // Whole months before the current one.
    for days in MONTH_DAYS.iter().take(month - 1) {
        total += days;
    }
    total + leap_days(year, month)
}

/// Leap-day correction. The year is decremented first when the date has not
/// yet passed February.
fn leap_days(year: i64, month: usize) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    y / 4 + y / 400 - y / 100
}

/// Difference `b - a` with manual borrow-down through the clock fields.
/// A negative seconds difference borrows from minutes, minutes from hours,
/// and hours from days, exactly like long-hand subtraction.
pub fn calendar_diff(a: DateTime<Utc>, b: DateTime<Utc>) -> CalendarDelta {
    let mut days = day_count(b) - day_count(a);
    let mut hours = b.hour() as i64 - a.hour() as i64;
    let mut minutes = b.minute() as i64 - a.minute() as i64;
    let mut seconds = b.second() as i64 - a.second() as i64;

    if seconds < 0 {
        seconds += 60;
        minutes -= 1;
    }
    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }

    CalendarDelta {
        days,
        hours,
        minutes,
        seconds,
    }
}

/// Whole days from `a` to `b`, including the clock-field borrow.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    calendar_diff(a, b).days
}

/// Days from the "never scanned" sentinel to `now`. The sentinel clock is
/// midnight, so no borrow from the clock fields can apply.
pub fn days_since_zero(now: DateTime<Utc>) -> i64 {
    day_count(now) - ZERO_DAY_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn same_instant_is_zero() {
        let t = ts(2024, 6, 15, 12, 0, 0);
        assert_eq!(
            calendar_diff(t, t),
            CalendarDelta {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn same_day_later_clock_is_zero_days() {
        let a = ts(2024, 6, 15, 1, 2, 3);
        let b = ts(2024, 6, 15, 23, 59, 59);
        let delta = calendar_diff(a, b);
        assert_eq!(delta.days, 0);
        assert_eq!(delta.hours, 22);
        assert_eq!(delta.minutes, 57);
        assert_eq!(delta.seconds, 56);
    }

    #[test]
    fn within_month() {
        assert_eq!(
            days_between(ts(2024, 1, 1, 0, 0, 0), ts(2024, 1, 31, 0, 0, 0)),
            30
        );
    }

    #[test]
    fn borrow_crosses_midnight() {
        // 90 minutes across midnight: the hour borrow pulls the day count
        // back down to zero.
        let a = ts(2024, 1, 1, 23, 30, 0);
        let b = ts(2024, 1, 2, 1, 0, 0);
        let delta = calendar_diff(a, b);
        assert_eq!(delta.days, 0);
        assert_eq!(delta.hours, 1);
        assert_eq!(delta.minutes, 30);
        assert_eq!(delta.seconds, 0);
    }

    #[test]
    fn seconds_borrow_chains_through_minutes_and_hours() {
        let a = ts(2024, 3, 10, 12, 30, 45);
        let b = ts(2024, 3, 11, 12, 30, 44);
        let delta = calendar_diff(a, b);
        assert_eq!(delta.days, 0);
        assert_eq!(delta.hours, 23);
        assert_eq!(delta.minutes, 59);
        assert_eq!(delta.seconds, 59);
    }

    #[test]
    fn year_boundary() {
        assert_eq!(
            days_between(ts(2023, 12, 31, 12, 0, 0), ts(2024, 1, 31, 12, 0, 0)),
            31
        );
    }

    #[test]
    fn non_negative_for_ordered_pairs() {
        let pairs = [
            (ts(2024, 1, 1, 0, 0, 0), ts(2024, 1, 1, 0, 0, 1)),
            (ts(2024, 2, 28, 23, 59, 59), ts(2024, 3, 1, 0, 0, 0)),
            (ts(2020, 6, 1, 8, 0, 0), ts(2024, 6, 1, 7, 59, 59)),
            (ts(1999, 12, 31, 23, 0, 0), ts(2000, 1, 1, 0, 30, 0)),
        ];
        for (a, b) in pairs {
            assert!(days_between(a, b) >= 0, "a={a} b={b}");
        }
    }

    #[test]
    fn zero_sentinel_regression_fixture() {
        // day_count(0001-01-01) = 366; day_count(2024-01-01) = 2024*365 + 1
        // + 490 leap days = 739_251.
        let now = ts(2024, 1, 1, 0, 0, 0);
        assert_eq!(days_since_zero(now), 738_885);
        assert!(days_since_zero(now) > 700_000);

        // The explicit-timestamp path agrees with the sentinel shortcut.
        let zero = ts(1, 1, 1, 0, 0, 0);
        assert_eq!(days_between(zero, now), 738_885);
    }

    #[test]
    fn fixed_february_in_day_count() {
        // The month table always charges February 28 days; the leap
        // correction ticks when the month moves past February.
        assert_eq!(
            days_between(ts(2024, 2, 28, 0, 0, 0), ts(2024, 3, 1, 0, 0, 0)),
            2
        );
        // Non-leap year: same field difference, one fewer leap day.
        assert_eq!(
            days_between(ts(2023, 2, 28, 0, 0, 0), ts(2023, 3, 1, 0, 0, 0)),
            1
        );
    }
}
