//! Chart series and aggregate statistics over a user's check-ins.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::checkin::{Activity, CheckIn, StressLevel};

/// One point per calendar day. Missing days keep `None` so the chart
/// draws a break instead of interpolating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mood: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub stress: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TrendSeries {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<TrendPoint>,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub checkins: i64,
    pub avg_mood: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub avg_stress: Option<f64>,
    pub stress_distribution: BTreeMap<&'static str, i64>,
    pub top_activities: Vec<ActivityCount>,
    pub best_day: Option<MoodDay>,
    pub worst_day: Option<MoodDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCount {
    pub activity: Activity,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodDay {
    pub date: NaiveDate,
    pub mood: i32,
}

/// Parse "7d" / "14d" / "30d" / "90d"; anything else falls back to a week.
pub fn range_days(range: Option<&str>) -> i64 {
    match range {
        Some("14d") => 14,
        Some("30d") => 30,
        Some("90d") => 90,
        _ => 7,
    }
}

pub fn trend_series(checkins: &[CheckIn], start: NaiveDate, end: NaiveDate) -> TrendSeries {
    let in_range: Vec<&CheckIn> = checkins
        .iter()
        .filter(|c| c.checkin_date >= start && c.checkin_date <= end)
        .collect();
    let by_date: HashMap<NaiveDate, &CheckIn> =
        in_range.iter().map(|c| (c.checkin_date, *c)).collect();

    let span = (end - start).num_days().max(-1) + 1;
    let points = (0..span)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let checkin = by_date.get(&date);
            TrendPoint {
                date,
                mood: checkin.map(|c| c.mood),
                sleep_hours: checkin.map(|c| c.sleep_hours),
                stress: checkin.map(|c| c.stress_level.level()),
            }
        })
        .collect();

    TrendSeries {
        start_date: start,
        end_date: end,
        points,
        summary: summarize(in_range),
    }
}

pub fn summarize<'a, I>(checkins: I) -> Summary
where
    I: IntoIterator<Item = &'a CheckIn>,
{
    let checkins: Vec<&CheckIn> = checkins.into_iter().collect();

    let mut stress_distribution: BTreeMap<&'static str, i64> =
        StressLevel::ALL.iter().map(|s| (s.label(), 0)).collect();
    let mut activity_counts: HashMap<Activity, i64> = HashMap::new();

    for c in &checkins {
        *stress_distribution.entry(c.stress_level.label()).or_default() += 1;
        for activity in c.activities.iter() {
            *activity_counts.entry(activity).or_default() += 1;
        }
    }

    let mut top_activities: Vec<ActivityCount> = activity_counts
        .into_iter()
        .map(|(activity, count)| ActivityCount { activity, count })
        .collect();
    top_activities.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.activity.as_str().cmp(b.activity.as_str()))
    });

    // Ties go to the most recent day
    let best_day = checkins
        .iter()
        .max_by_key(|c| (c.mood, c.checkin_date))
        .map(|c| MoodDay { date: c.checkin_date, mood: c.mood });
    let worst_day = checkins
        .iter()
        .min_by_key(|c| (c.mood, std::cmp::Reverse(c.checkin_date)))
        .map(|c| MoodDay { date: c.checkin_date, mood: c.mood });

    Summary {
        checkins: checkins.len() as i64,
        avg_mood: average(checkins.iter().map(|c| c.mood as f64)),
        avg_sleep_hours: average(checkins.iter().map(|c| c.sleep_hours)),
        avg_stress: average(checkins.iter().map(|c| c.stress_level.level() as f64)),
        stress_distribution,
        top_activities,
        best_day,
        worst_day,
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(round2(sum / n as f64))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checkin::{sample_checkin, ActivitySet};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn checkin(date: &str, mood: i32, sleep: f64, stress: StressLevel, tags: &[Activity]) -> CheckIn {
        let mut c = sample_checkin(day(date), mood);
        c.sleep_hours = sleep;
        c.stress_level = stress;
        c.activities = tags.iter().copied().collect::<ActivitySet>();
        c
    }

    #[test]
    fn test_range_days_fallback() {
        assert_eq!(range_days(None), 7);
        assert_eq!(range_days(Some("30d")), 30);
        assert_eq!(range_days(Some("365d")), 7);
    }

    #[test]
    fn test_series_has_point_per_day_with_gaps() {
        let checkins = vec![
            checkin("2024-03-01", 6, 7.0, StressLevel::Low, &[]),
            checkin("2024-03-03", 8, 8.5, StressLevel::High, &[]),
            checkin("2024-02-20", 1, 3.0, StressLevel::VeryHigh, &[]),
        ];
        let series = trend_series(&checkins, day("2024-03-01"), day("2024-03-04"));

        assert_eq!(series.points.len(), 4);
        assert_eq!(series.points[0].mood, Some(6));
        assert_eq!(series.points[1].mood, None);
        assert_eq!(series.points[1].sleep_hours, None);
        assert_eq!(series.points[2].stress, Some(3));
        assert_eq!(series.points[3].date, day("2024-03-04"));
        assert_eq!(series.summary.checkins, 2);
    }

    #[test]
    fn test_single_day_range() {
        let series = trend_series(&[], day("2024-03-01"), day("2024-03-01"));
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.summary.avg_mood, None);
    }

    #[test]
    fn test_summary_averages_rounded() {
        let checkins = vec![
            checkin("2024-03-01", 7, 7.0, StressLevel::Low, &[]),
            checkin("2024-03-02", 8, 6.5, StressLevel::Moderate, &[]),
            checkin("2024-03-03", 8, 8.0, StressLevel::Moderate, &[]),
        ];
        let summary = summarize(&checkins);
        assert_eq!(summary.avg_mood, Some(7.67));
        assert_eq!(summary.avg_sleep_hours, Some(7.17));
        assert_eq!(summary.avg_stress, Some(1.67));
        assert_eq!(summary.stress_distribution["Moderate"], 2);
        assert_eq!(summary.stress_distribution["Very High"], 0);
    }

    #[test]
    fn test_top_activities_sorted_by_count_then_name() {
        use Activity::*;
        let checkins = vec![
            checkin("2024-03-01", 5, 7.0, StressLevel::Low, &[Work, Reading]),
            checkin("2024-03-02", 5, 7.0, StressLevel::Low, &[Work, Exercise]),
            checkin("2024-03-03", 5, 7.0, StressLevel::Low, &[Reading, Work]),
        ];
        let top = summarize(&checkins).top_activities;
        assert_eq!(
            top,
            vec![
                ActivityCount { activity: Work, count: 3 },
                ActivityCount { activity: Reading, count: 2 },
                ActivityCount { activity: Exercise, count: 1 },
            ]
        );
    }

    #[test]
    fn test_best_and_worst_prefer_recent_ties() {
        let checkins = vec![
            checkin("2024-03-01", 9, 7.0, StressLevel::Low, &[]),
            checkin("2024-03-02", 2, 7.0, StressLevel::Low, &[]),
            checkin("2024-03-03", 9, 7.0, StressLevel::Low, &[]),
            checkin("2024-03-04", 2, 7.0, StressLevel::Low, &[]),
        ];
        let summary = summarize(&checkins);
        assert_eq!(summary.best_day, Some(MoodDay { date: day("2024-03-03"), mood: 9 }));
        assert_eq!(summary.worst_day, Some(MoodDay { date: day("2024-03-04"), mood: 2 }));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&Vec::<CheckIn>::new());
        assert_eq!(summary.checkins, 0);
        assert!(summary.top_activities.is_empty());
        assert_eq!(summary.best_day, None);
        assert_eq!(summary.stress_distribution.len(), 4);
    }
}
