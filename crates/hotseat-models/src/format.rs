//! Text renderings of a week's attendance.
//!
//! All pure functions of a document snapshot; on-demand queries and
//! scheduled reminders share these renderings.

use chrono::{DateTime, Duration, FixedOffset};

use crate::days::day_abbrev;
use crate::deficit::{deficit_days, week_status};
use crate::error::Result;
use crate::schedule::ScheduleDoc;
use crate::week::{monday_of, week_key, WeekKey};

/// Marker for a day below the minimum.
pub const DEFICIT_MARK: &str = "🔴";

/// Marker for a satisfied day.
pub const OK_MARK: &str = "🟢";

/// Render a full week: a header spanning Monday's and Friday's dates,
/// then one line per weekday with marker, date, count and names.
pub fn format_week(
    doc: &ScheduleDoc,
    week: &WeekKey,
    label: &str,
    min_people: usize,
) -> Result<String> {
    let monday = monday_of(week)?;
    let friday = monday + Duration::days(4);
    let mut lines = vec![format!(
        "📅 {label}{} — {}\n",
        monday.format("%d.%m"),
        friday.format("%d.%m.%Y"),
    )];

    for status in week_status(doc, week, min_people)? {
        let marker = if status.is_deficit() { DEFICIT_MARK } else { OK_MARK };
        let names = if status.attendees.is_empty() {
            "—".to_string()
        } else {
            status.attendees.join(", ")
        };
        lines.push(format!(
            "{marker} {} ({}):  [{}]  {names}",
            day_abbrev(status.day),
            status.date.format("%d.%m"),
            status.count(),
        ));
    }

    Ok(lines.join("\n"))
}

/// Render only the deficit days of a week with their shortfalls, or a
/// single all-covered message when there are none.
pub fn format_problem_days(doc: &ScheduleDoc, week: &WeekKey, min_people: usize) -> Result<String> {
    let problems = deficit_days(doc, week, min_people, 0)?;
    if problems.is_empty() {
        return Ok(format!(
            "✅ All days covered, at least {min_people} people each!"
        ));
    }

    let lines: Vec<String> = problems
        .iter()
        .map(|d| {
            format!(
                "  {DEFICIT_MARK} {} ({}) — {} more needed",
                day_abbrev(d.day),
                d.date.format("%d.%m"),
                d.shortfall,
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Textual snapshot of the current and next week for the language-model
/// context: per-day attendees, counts and an OK/SHORT status.
pub fn schedule_summary(
    doc: &ScheduleDoc,
    now: DateTime<FixedOffset>,
    min_people: usize,
) -> Result<String> {
    let this = week_key(now);
    let next = week_key(now + Duration::weeks(1));

    let mut lines = Vec::new();
    for (label, wk) in [("This week", &this), ("Next week", &next)] {
        let monday = monday_of(wk)?;
        lines.push(format!("\n{label} ({}):", monday.format("%d.%m.%Y")));
        for status in week_status(doc, wk, min_people)? {
            let people = if status.attendees.is_empty() {
                "nobody".to_string()
            } else {
                status.attendees.join(", ")
            };
            let state = if status.is_deficit() { "⚠️ SHORT" } else { "OK" };
            lines.push(format!(
                "  {}: {} ({}) — {state}",
                day_abbrev(status.day),
                people,
                status.count(),
            ));
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::week::office_tz;

    const WEEK: &str = "2026-08-03";
    const MIN: usize = 2;

    fn sample_doc() -> ScheduleDoc {
        let mut doc = ScheduleDoc::default();
        let week = WeekKey::from(WEEK);
        doc.set_days("1", "Alice", &[0, 2], &week);
        doc.set_days("2", "Bob", &[0], &week);
        doc
    }

    #[test]
    fn test_format_week_header_and_markers() {
        let text = format_week(&sample_doc(), &WeekKey::from(WEEK), "This week: ", MIN).unwrap();

        assert!(text.starts_with("📅 This week: 03.08 — 07.08.2026"));
        // Monday is satisfied, Tuesday is not.
        assert!(text.contains("🟢 Mon (03.08):  [2]  Alice, Bob"));
        assert!(text.contains("🔴 Tue (04.08):  [0]  —"));
        assert!(text.contains("🔴 Wed (05.08):  [1]  Alice"));
    }

    #[test]
    fn test_format_problem_days_lists_shortfalls() {
        let text = format_problem_days(&sample_doc(), &WeekKey::from(WEEK), MIN).unwrap();

        assert!(!text.contains("Mon"));
        assert!(text.contains("🔴 Tue (04.08) — 2 more needed"));
        assert!(text.contains("🔴 Wed (05.08) — 1 more needed"));
    }

    #[test]
    fn test_format_problem_days_all_covered() {
        let mut doc = sample_doc();
        let week = WeekKey::from(WEEK);
        doc.set_days("1", "Alice", &[0, 1, 2, 3, 4], &week);
        doc.set_days("2", "Bob", &[0, 1, 2, 3, 4], &week);

        let text = format_problem_days(&doc, &week, MIN).unwrap();
        assert!(text.starts_with("✅"));
        assert!(!text.contains(DEFICIT_MARK));
    }

    #[test]
    fn test_schedule_summary_covers_both_weeks() {
        let now = office_tz().with_ymd_and_hms(2026, 8, 4, 13, 0, 0).unwrap();
        let text = schedule_summary(&sample_doc(), now, MIN).unwrap();

        assert!(text.contains("This week (03.08.2026):"));
        assert!(text.contains("Next week (10.08.2026):"));
        assert!(text.contains("Mon: Alice, Bob (2) — OK"));
        assert!(text.contains("Tue: nobody (0) — ⚠️ SHORT"));
    }
}
