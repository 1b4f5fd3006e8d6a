//! Streak counting over check-in dates.
//!
//! Both functions take dates in any order and tolerate duplicates; the
//! stored invariant (one check-in per user per day) is not assumed.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_checkins: i64,
    pub last_checkin: Option<NaiveDate>,
}

impl StreakSummary {
    pub fn from_dates(dates: &[NaiveDate], today: NaiveDate) -> Self {
        let past = distinct_desc(dates, today);
        Self {
            current_streak: current_streak(dates, today),
            longest_streak: longest_streak(&past),
            total_checkins: past.len() as i64,
            last_checkin: past.first().copied(),
        }
    }
}

/// Consecutive days ending at `today` that have a check-in. Zero when today
/// has none yet. Dates after `today` are ignored.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> i32 {
    let mut streak = 0i32;
    let mut check_date = today;

    for date in distinct_desc(dates, today) {
        if date == check_date {
            streak += 1;
            check_date -= Duration::days(1);
        } else {
            break;
        }
    }

    streak
}

/// Longest run of consecutive calendar days anywhere in `dates`.
pub fn longest_streak(dates: &[NaiveDate]) -> i32 {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut longest = 0i32;
    let mut streak = 0i32;
    let mut prev: Option<NaiveDate> = None;

    for date in sorted {
        streak = match prev {
            Some(p) if date == p + Duration::days(1) => streak + 1,
            _ => 1,
        };
        longest = longest.max(streak);
        prev = Some(date);
    }

    longest
}

fn distinct_desc(dates: &[NaiveDate], today: NaiveDate) -> Vec<NaiveDate> {
    let mut past: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    past.sort_unstable_by(|a, b| b.cmp(a));
    past.dedup();
    past
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn days(list: &[&str]) -> Vec<NaiveDate> {
        list.iter().map(|s| day(s)).collect()
    }

    #[test]
    fn test_empty_history() {
        let today = day("2024-03-10");
        assert_eq!(current_streak(&[], today), 0);
        assert_eq!(longest_streak(&[]), 0);
        let summary = StreakSummary::from_dates(&[], today);
        assert_eq!(summary.total_checkins, 0);
        assert_eq!(summary.last_checkin, None);
    }

    #[test]
    fn test_streak_ending_today() {
        let dates = days(&["2024-03-08", "2024-03-09", "2024-03-10"]);
        assert_eq!(current_streak(&dates, day("2024-03-10")), 3);
    }

    #[test]
    fn test_no_checkin_today_breaks_streak() {
        let dates = days(&["2024-03-08", "2024-03-09"]);
        assert_eq!(current_streak(&dates, day("2024-03-10")), 0);
    }

    #[test]
    fn test_gap_stops_count() {
        let dates = days(&["2024-03-05", "2024-03-06", "2024-03-08", "2024-03-09", "2024-03-10"]);
        assert_eq!(current_streak(&dates, day("2024-03-10")), 3);
    }

    #[test]
    fn test_unordered_duplicates_and_future() {
        let dates = days(&["2024-03-10", "2024-03-11", "2024-03-09", "2024-03-10", "2024-03-09"]);
        assert_eq!(current_streak(&dates, day("2024-03-10")), 2);
    }

    #[test]
    fn test_streak_across_month_and_leap_day() {
        let dates = days(&["2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(current_streak(&dates, day("2024-03-01")), 3);
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_longest_streak_in_the_past() {
        let dates = days(&[
            "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04",
            "2024-02-10",
            "2024-03-09", "2024-03-10",
        ]);
        assert_eq!(longest_streak(&dates), 4);
        let summary = StreakSummary::from_dates(&dates, day("2024-03-10"));
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.longest_streak, 4);
        assert_eq!(summary.total_checkins, 7);
        assert_eq!(summary.last_checkin, Some(day("2024-03-10")));
    }

    #[test]
    fn test_summary_ignores_future_dates() {
        let dates = days(&["2024-03-10", "2024-03-11"]);
        let summary = StreakSummary::from_dates(&dates, day("2024-03-10"));
        assert_eq!(summary.total_checkins, 1);
        assert_eq!(summary.last_checkin, Some(day("2024-03-10")));
    }
}
