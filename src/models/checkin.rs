use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Longest listable range, counted in calendar days including both ends.
pub const MAX_HISTORY_DAYS: i64 = 366;
const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Dates outside these years are rejected before they reach Postgres.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

pub fn check_year(year: i32) -> Result<(), String> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"));
    }
    Ok(())
}

pub fn check_date(date: NaiveDate) -> Result<NaiveDate, String> {
    check_year(date.year())?;
    Ok(date)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub checkin_date: NaiveDate,
    pub mood: i32,
    pub sleep_hours: f64,
    pub stress_level: StressLevel,
    pub journal: Option<String>,
    #[sqlx(try_from = "Vec<String>")]
    pub activities: ActivitySet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckIn {
    pub fn mood_face(&self) -> MoodFace {
        MoodFace::from_mood(self.mood)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stress_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl StressLevel {
    pub const ALL: [StressLevel; 4] = [
        StressLevel::Low,
        StressLevel::Moderate,
        StressLevel::High,
        StressLevel::VeryHigh,
    ];

    /// Ordinal on the 1-4 scale used by charts.
    pub fn level(self) -> i32 {
        match self {
            StressLevel::Low => 1,
            StressLevel::Moderate => 2,
            StressLevel::High => 3,
            StressLevel::VeryHigh => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Moderate => "Moderate",
            StressLevel::High => "High",
            StressLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Exercise,
    Meditation,
    Reading,
    Social,
    Work,
    Outdoors,
    Creative,
    Rest,
}

impl Activity {
    pub const ALL: [Activity; 8] = [
        Activity::Exercise,
        Activity::Meditation,
        Activity::Reading,
        Activity::Social,
        Activity::Work,
        Activity::Outdoors,
        Activity::Creative,
        Activity::Rest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Exercise => "exercise",
            Activity::Meditation => "meditation",
            Activity::Reading => "reading",
            Activity::Social => "social",
            Activity::Work => "work",
            Activity::Outdoors => "outdoors",
            Activity::Creative => "creative",
            Activity::Rest => "rest",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown activity tag: {0}")]
pub struct UnknownActivity(pub String);

impl FromStr for Activity {
    type Err = UnknownActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownActivity(s.to_string()))
    }
}

/// Activity tags attached to a check-in. Duplicates collapse; iteration
/// follows the declaration order of [`Activity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivitySet(BTreeSet<Activity>);

impl ActivitySet {
    pub fn iter(&self) -> impl Iterator<Item = Activity> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, activity: Activity) -> bool {
        self.0.contains(&activity)
    }

    /// Column value for the `activities TEXT[]` column.
    pub fn to_db(&self) -> Vec<String> {
        self.iter().map(|a| a.as_str().to_string()).collect()
    }

    pub fn joined(&self, sep: &str) -> String {
        self.iter().map(Activity::as_str).collect::<Vec<_>>().join(sep)
    }
}

impl FromIterator<Activity> for ActivitySet {
    fn from_iter<I: IntoIterator<Item = Activity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<Vec<String>> for ActivitySet {
    type Error = UnknownActivity;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        raw.iter().map(|s| s.parse()).collect()
    }
}

/// Five-step emoji scale shown above the mood slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodFace {
    Awful,
    Low,
    Okay,
    Good,
    Great,
}

impl MoodFace {
    /// Face for a 1-10 mood. Out-of-range values clamp to the nearest end.
    pub fn from_mood(mood: i32) -> Self {
        match mood {
            i32::MIN..=2 => MoodFace::Awful,
            3..=4 => MoodFace::Low,
            5..=6 => MoodFace::Okay,
            7..=8 => MoodFace::Good,
            _ => MoodFace::Great,
        }
    }

    /// Slider position a tap on this face selects.
    pub fn score(self) -> i32 {
        match self {
            MoodFace::Awful => 2,
            MoodFace::Low => 4,
            MoodFace::Okay => 6,
            MoodFace::Good => 8,
            MoodFace::Great => 10,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodFace::Awful => "😢",
            MoodFace::Low => "😟",
            MoodFace::Okay => "😐",
            MoodFace::Good => "🙂",
            MoodFace::Great => "😄",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCheckInRequest {
    /// Calendar day this check-in is for. Default: the caller's today.
    pub checkin_date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: Option<i32>,

    /// Used when `mood` is absent.
    pub mood_face: Option<MoodFace>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: f64,

    pub stress_level: StressLevel,

    #[validate(length(max = 500, message = "Journal must be at most 500 characters"))]
    pub journal: Option<String>,

    #[serde(default)]
    pub activities: ActivitySet,
}

/// A validated check-in ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckIn {
    pub checkin_date: NaiveDate,
    pub mood: i32,
    pub sleep_hours: f64,
    pub stress_level: StressLevel,
    pub journal: Option<String>,
    pub activities: ActivitySet,
}

impl UpsertCheckInRequest {
    /// Normalize, validate, and resolve defaults against `today`.
    pub fn into_new_checkin(mut self, today: NaiveDate) -> Result<NewCheckIn, String> {
        self.journal = self
            .journal
            .map(|j| j.trim().to_string())
            .filter(|j| !j.is_empty());

        self.validate().map_err(|e| e.to_string())?;
        // NaN slips through range checks
        if !self.sleep_hours.is_finite() {
            return Err("Sleep hours must be a number".into());
        }

        let mood = self.resolve_mood()?;
        let checkin_date = check_date(self.checkin_date.unwrap_or(today))?;
        if checkin_date > today + Duration::days(1) {
            return Err("Check-in date cannot be in the future".into());
        }

        Ok(NewCheckIn {
            checkin_date,
            mood,
            sleep_hours: self.sleep_hours,
            stress_level: self.stress_level,
            journal: self.journal,
            activities: self.activities,
        })
    }

    /// Explicit mood wins; otherwise the tapped face decides.
    pub fn resolve_mood(&self) -> Result<i32, String> {
        match (self.mood, self.mood_face) {
            (Some(mood), _) => Ok(mood),
            (None, Some(face)) => Ok(face.score()),
            (None, None) => Err("Either mood or mood_face must be provided".into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl CheckInQuery {
    /// Inclusive date range, defaulting to the 30 days ending `today`.
    pub fn resolve_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
        let end = check_date(self.end_date.unwrap_or(today))?;
        let start = match self.start_date {
            Some(start) => check_date(start)?,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_HISTORY_DAYS - 1))
                .ok_or_else(|| "end_date is out of range".to_string())?,
        };

        if start > end {
            return Err("start_date must not be after end_date".into());
        }
        if (end - start).num_days() + 1 > MAX_HISTORY_DAYS {
            return Err(format!(
                "Date range must not exceed {} days",
                MAX_HISTORY_DAYS
            ));
        }
        Ok((start, end))
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(MAX_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS)
    }
}

#[cfg(test)]
pub(crate) fn sample_checkin(date: NaiveDate, mood: i32) -> CheckIn {
    CheckIn {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        checkin_date: date,
        mood,
        sleep_hours: 7.5,
        stress_level: StressLevel::Moderate,
        journal: None,
        activities: ActivitySet::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(body: serde_json::Value) -> UpsertCheckInRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_mood_face_buckets() {
        assert_eq!(MoodFace::from_mood(1), MoodFace::Awful);
        assert_eq!(MoodFace::from_mood(2), MoodFace::Awful);
        assert_eq!(MoodFace::from_mood(4), MoodFace::Low);
        assert_eq!(MoodFace::from_mood(5), MoodFace::Okay);
        assert_eq!(MoodFace::from_mood(8), MoodFace::Good);
        assert_eq!(MoodFace::from_mood(10), MoodFace::Great);
    }

    #[test]
    fn test_mood_face_score_lands_in_own_bucket() {
        for face in [
            MoodFace::Awful,
            MoodFace::Low,
            MoodFace::Okay,
            MoodFace::Good,
            MoodFace::Great,
        ] {
            assert_eq!(MoodFace::from_mood(face.score()), face);
        }
    }

    #[test]
    fn test_stress_level_wire_format() {
        let level: StressLevel = serde_json::from_value(json!("very_high")).unwrap();
        assert_eq!(level, StressLevel::VeryHigh);
        assert_eq!(level.level(), 4);
        assert_eq!(level.label(), "Very High");
    }

    #[test]
    fn test_activity_set_dedups_and_orders() {
        let set: ActivitySet =
            serde_json::from_value(json!(["rest", "exercise", "rest", "reading"])).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.joined(";"), "exercise;reading;rest");
    }

    #[test]
    fn test_activity_set_rejects_unknown_db_value() {
        let err = ActivitySet::try_from(vec!["exercise".to_string(), "skydiving".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown activity tag: skydiving");
    }

    #[test]
    fn test_valid_request_resolves() {
        let today = day("2024-03-10");
        let new = request(json!({
            "mood": 7,
            "sleep_hours": 7.25,
            "stress_level": "low",
            "journal": "  good walk  ",
            "activities": ["outdoors"]
        }))
        .into_new_checkin(today)
        .unwrap();

        assert_eq!(new.checkin_date, today);
        assert_eq!(new.mood, 7);
        assert_eq!(new.journal.as_deref(), Some("good walk"));
        assert!(new.activities.contains(Activity::Outdoors));
    }

    #[test]
    fn test_blank_journal_becomes_none() {
        let new = request(json!({
            "mood": 5, "sleep_hours": 8, "stress_level": "high", "journal": "   "
        }))
        .into_new_checkin(day("2024-03-10"))
        .unwrap();
        assert_eq!(new.journal, None);
    }

    #[test]
    fn test_mood_face_used_when_mood_missing() {
        let new = request(json!({
            "mood_face": "good", "sleep_hours": 6, "stress_level": "moderate"
        }))
        .into_new_checkin(day("2024-03-10"))
        .unwrap();
        assert_eq!(new.mood, 8);
    }

    #[test]
    fn test_explicit_mood_beats_face() {
        let req = request(json!({
            "mood": 3, "mood_face": "great", "sleep_hours": 6, "stress_level": "low"
        }));
        assert_eq!(req.resolve_mood().unwrap(), 3);
    }

    #[test]
    fn test_missing_mood_rejected() {
        let err = request(json!({ "sleep_hours": 6, "stress_level": "low" }))
            .into_new_checkin(day("2024-03-10"))
            .unwrap_err();
        assert!(err.contains("mood"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let today = day("2024-03-10");
        assert!(request(json!({ "mood": 11, "sleep_hours": 6, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_err());
        assert!(request(json!({ "mood": 0, "sleep_hours": 6, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_err());
        assert!(request(json!({ "mood": 5, "sleep_hours": 24.5, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_err());
        assert!(request(json!({ "mood": 5, "sleep_hours": -1, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_err());
    }

    #[test]
    fn test_sleep_bounds_inclusive() {
        let today = day("2024-03-10");
        assert!(request(json!({ "mood": 5, "sleep_hours": 0, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_ok());
        assert!(request(json!({ "mood": 5, "sleep_hours": 24, "stress_level": "low" }))
            .into_new_checkin(today)
            .is_ok());
    }

    #[test]
    fn test_journal_limit_counts_characters() {
        let today = day("2024-03-10");
        let at_limit = "é".repeat(500);
        assert!(request(json!({
            "mood": 5, "sleep_hours": 6, "stress_level": "low", "journal": at_limit
        }))
        .into_new_checkin(today)
        .is_ok());

        let over = "a".repeat(501);
        assert!(request(json!({
            "mood": 5, "sleep_hours": 6, "stress_level": "low", "journal": over
        }))
        .into_new_checkin(today)
        .is_err());
    }

    #[test]
    fn test_future_date_window() {
        let today = day("2024-03-10");
        assert!(request(json!({
            "checkin_date": "2024-03-11", "mood": 5, "sleep_hours": 6, "stress_level": "low"
        }))
        .into_new_checkin(today)
        .is_ok());
        assert!(request(json!({
            "checkin_date": "2024-03-12", "mood": 5, "sleep_hours": 6, "stress_level": "low"
        }))
        .into_new_checkin(today)
        .is_err());
    }

    #[test]
    fn test_query_range_defaults_to_last_30_days() {
        let today = day("2024-03-31");
        let (start, end) = CheckInQuery::default().resolve_range(today).unwrap();
        assert_eq!(start, day("2024-03-02"));
        assert_eq!(end, today);
        assert_eq!((end - start).num_days() + 1, 30);
    }

    #[test]
    fn test_query_range_span_counts_both_ends() {
        let today = day("2024-12-31");
        let full_year = CheckInQuery {
            start_date: Some(day("2024-01-01")),
            end_date: Some(day("2024-12-31")),
            limit: None,
        };
        assert!(full_year.resolve_range(today).is_ok());

        let one_more = CheckInQuery {
            start_date: Some(day("2023-12-31")),
            end_date: Some(day("2024-12-31")),
            limit: None,
        };
        assert!(one_more.resolve_range(today).is_err());
    }

    #[test]
    fn test_query_range_rejects_extreme_dates() {
        let today = day("2024-03-10");
        let earliest = NaiveDate::MIN;
        let query = CheckInQuery {
            end_date: Some(earliest),
            ..Default::default()
        };
        assert!(query.resolve_range(today).is_err());

        let query = CheckInQuery {
            start_date: Some(day("1899-12-31")),
            end_date: Some(day("1900-01-05")),
            limit: None,
        };
        assert!(query.resolve_range(today).is_err());

        let query = CheckInQuery {
            start_date: Some(day("1900-01-01")),
            end_date: Some(day("1900-01-05")),
            limit: None,
        };
        assert!(query.resolve_range(today).is_ok());
    }

    #[test]
    fn test_extended_year_query_parses_then_rejects() {
        let uri: axum::http::Uri = "/api/checkins?end_date=-262143-01-01".parse().unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<CheckInQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.end_date.map(|d| d.year()), Some(-262143));
        assert!(query.resolve_range(day("2024-03-10")).is_err());
    }

    #[test]
    fn test_ancient_checkin_date_rejected() {
        let err = request(json!({
            "checkin_date": "-5000-01-01", "mood": 5, "sleep_hours": 6, "stress_level": "low"
        }))
        .into_new_checkin(day("2024-03-10"))
        .unwrap_err();
        assert!(err.contains("Year"));

        assert!(request(json!({
            "checkin_date": "1900-01-01", "mood": 5, "sleep_hours": 6, "stress_level": "low"
        }))
        .into_new_checkin(day("2024-03-10"))
        .is_ok());
    }

    #[test]
    fn test_query_range_rejects_inverted_and_oversized() {
        let today = day("2024-03-31");
        let inverted = CheckInQuery {
            start_date: Some(day("2024-03-20")),
            end_date: Some(day("2024-03-10")),
            limit: None,
        };
        assert!(inverted.resolve_range(today).is_err());

        let oversized = CheckInQuery {
            start_date: Some(day("2022-01-01")),
            end_date: Some(day("2024-01-01")),
            limit: None,
        };
        assert!(oversized.resolve_range(today).is_err());
    }

    #[test]
    fn test_query_limit_clamped() {
        let q = CheckInQuery { limit: Some(0), ..Default::default() };
        assert_eq!(q.limit(), 1);
        let q = CheckInQuery { limit: Some(10_000), ..Default::default() };
        assert_eq!(q.limit(), MAX_HISTORY_DAYS);
    }
}
