//! Month grid for the calendar view.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::checkin::{check_year, CheckIn, MoodFace, StressLevel};

#[derive(Debug, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    /// Sunday-first weekday headers.
    pub weekdays: [&'static str; 7],
    /// Rows of seven cells; `None` pads days outside the month.
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
    pub days_logged: u32,
    pub days_in_month: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub is_future: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<DayMark>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayMark {
    pub mood: i32,
    pub mood_face: MoodFace,
    pub emoji: &'static str,
    pub stress_level: StressLevel,
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub fn month_grid(
    year: i32,
    month: u32,
    checkins: &[CheckIn],
    today: NaiveDate,
) -> Result<MonthGrid, String> {
    let (first, last) = month_bounds(year, month)?;
    let days_in_month = last.day();

    let by_date: HashMap<NaiveDate, &CheckIn> = checkins
        .iter()
        .filter(|c| c.checkin_date.year() == year && c.checkin_date.month() == month)
        .map(|c| (c.checkin_date, c))
        .collect();

    let lead = first.weekday().num_days_from_sunday() as usize;
    let rows = (lead + days_in_month as usize).div_ceil(7);
    let mut weeks: Vec<[Option<CalendarDay>; 7]> = (0..rows).map(|_| Default::default()).collect();

    for offset in 0..days_in_month {
        let date = first + Duration::days(offset as i64);
        let slot = lead + offset as usize;
        weeks[slot / 7][slot % 7] = Some(CalendarDay {
            date,
            day: date.day(),
            is_today: date == today,
            is_future: date > today,
            checkin: by_date.get(&date).map(|c| {
                let face = c.mood_face();
                DayMark {
                    mood: c.mood,
                    mood_face: face,
                    emoji: face.emoji(),
                    stress_level: c.stress_level,
                }
            }),
        });
    }

    Ok(MonthGrid {
        year,
        month,
        month_name: MONTH_NAMES[(month - 1) as usize],
        weekdays: WEEKDAYS,
        weeks,
        days_logged: by_date.len() as u32,
        days_in_month,
    })
}

/// First and last day of the given month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), String> {
    check_year(year)?;
    let invalid = || format!("Invalid month: {year}-{month}");
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next.and_then(|n| n.pred_opt()).ok_or_else(invalid)?;
    Ok((first, last))
}
