//! Per-day headcount deficits.

use chrono::{Duration, NaiveDate};

use crate::days::WEEKDAYS;
use crate::error::Result;
use crate::schedule::ScheduleDoc;
use crate::week::WeekKey;

/// Attendance status of one weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStatus {
    /// Weekday index, 0 = Monday.
    pub day: u8,
    /// Calendar date of the day.
    pub date: NaiveDate,
    /// Resolved attendee names, in stable member order.
    pub attendees: Vec<String>,
    /// People still needed to reach the minimum (0 when satisfied).
    pub shortfall: usize,
}

impl DayStatus {
    /// Whether this day is below the required minimum.
    pub fn is_deficit(&self) -> bool {
        self.shortfall > 0
    }

    /// Attendee count.
    pub fn count(&self) -> usize {
        self.attendees.len()
    }
}

/// Per-day status of a week against a required minimum.
///
/// Deterministic for a given document snapshot; a week with no record
/// yields five empty days.
pub fn week_status(doc: &ScheduleDoc, week: &WeekKey, min_people: usize) -> Result<Vec<DayStatus>> {
    let monday = week.monday()?;
    let mut days = Vec::with_capacity(WEEKDAYS);
    for day in 0..WEEKDAYS as u8 {
        let attendees = doc.attendees(week, day);
        let shortfall = min_people.saturating_sub(attendees.len());
        days.push(DayStatus {
            day,
            date: monday + Duration::days(i64::from(day)),
            attendees,
            shortfall,
        });
    }
    Ok(days)
}

/// The deficit days of a week, restricted to indices at or after
/// `from_day`.
pub fn deficit_days(
    doc: &ScheduleDoc,
    week: &WeekKey,
    min_people: usize,
    from_day: u8,
) -> Result<Vec<DayStatus>> {
    Ok(week_status(doc, week, min_people)?
        .into_iter()
        .filter(|d| d.day >= from_day && d.is_deficit())
        .collect())
}
