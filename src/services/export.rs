use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::checkin::CheckIn;
use crate::models::user::UserProfile;

pub const CSV_HEADER: [&str; 7] = [
    "date",
    "mood",
    "sleep_hours",
    "stress_level",
    "activities",
    "journal",
    "created_at",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn filename(self, date: NaiveDate) -> String {
        format!("wellness-export-{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

#[derive(Debug, Serialize)]
pub struct JsonExport<'a> {
    pub exported_at: DateTime<Utc>,
    pub user: &'a UserProfile,
    pub checkins: Vec<&'a CheckIn>,
}

/// Check-ins as CSV, oldest first. Activities are `;`-joined.
pub fn to_csv(checkins: &[CheckIn]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for c in sorted_by_date(checkins) {
        writer.write_record([
            c.checkin_date.format("%Y-%m-%d").to_string(),
            c.mood.to_string(),
            c.sleep_hours.to_string(),
            c.stress_level.label().to_string(),
            c.activities.joined(";"),
            c.journal.clone().unwrap_or_default(),
            c.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn to_json(user: &UserProfile, checkins: &[CheckIn]) -> serde_json::Result<String> {
    let export = JsonExport {
        exported_at: Utc::now(),
        user,
        checkins: sorted_by_date(checkins),
    };
    serde_json::to_string_pretty(&export)
}

fn sorted_by_date(checkins: &[CheckIn]) -> Vec<&CheckIn> {
    let mut sorted: Vec<&CheckIn> = checkins.iter().collect();
    sorted.sort_by_key(|c| c.checkin_date);
    sorted
}
