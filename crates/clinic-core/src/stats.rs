//! Dashboard statistics.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Headline counters for the admin and doctor dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStats {
    /// Live appointments
    pub total_appointments: i64,
    /// Doctors with status `active`
    pub active_doctors: i64,
    /// Distinct users holding appointments
    pub total_patients: i64,
    /// Live appointments still pending
    pub pending_appointments: i64,
}

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    /// Weekday name
    pub x: String,
    /// Appointments on that day
    pub y: u32,
}

/// Chart series in the shape the dashboard charting library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySeries {
    /// Series label
    pub id: String,
    /// Chart color
    pub color: String,
    /// One point per weekday, Monday first
    pub data: Vec<WeeklyPoint>,
}

impl WeeklySeries {
    /// Wraps the histogram as the "Appointments" series.
    pub fn appointments(data: Vec<WeeklyPoint>) -> Self {
        Self {
            id: "Appointments".to_string(),
            color: "hsl(217, 70%, 50%)".to_string(),
            data,
        }
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday of the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Counts `dates` per weekday of the ISO week containing `week_of`.
///
/// Always returns seven points, Monday first. Dates outside that week are
/// ignored.
pub fn weekly_histogram<I>(dates: I, week_of: NaiveDate) -> Vec<WeeklyPoint>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let start = week_start(week_of);
    let mut counts = [0u32; 7];
    for date in dates {
        let offset = (date - start).num_days();
        if (0..7).contains(&offset) {
            counts[date.weekday().num_days_from_monday() as usize] += 1;
        }
    }
    WEEK.iter()
        .zip(counts)
        .map(|(day, y)| WeeklyPoint {
            x: day_name(*day).to_string(),
            y,
        })
        .collect()
}
