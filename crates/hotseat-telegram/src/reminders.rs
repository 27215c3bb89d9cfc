//! Proactive reminders and retention sweeping.
//!
//! One background loop ticks once a minute, samples the office clock,
//! and fires each job at most once per day during its scheduled hour.
//! Every check is a pure read of a schedule snapshot producing an
//! optional alert text; delivery is a best-effort broadcast where each
//! registered chat is attempted independently.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use teloxide::prelude::*;
use tokio::time::interval;
use tracing::{info, warn};

use hotseat_models::{
    day_abbrev, day_full_name, deficit_days, office_now, week_key, week_status, DayStatus,
    ScheduleDoc,
};

use crate::config::{
    END_OF_WEEK_DAY, END_OF_WEEK_HOUR, MIDWEEK_DAY, MIDWEEK_HOUR, MORNING_HOUR, RETENTION_WEEKS,
    SWEEP_DAY, SWEEP_HOUR,
};
use crate::state::BotState;

/// How often the loop samples the clock.
const TICK_SECS: u64 = 60;

/// Spawn the reminder/sweep loop as a background task.
pub fn spawn(bot: Bot, state: Arc<BotState>) {
    tokio::spawn(async move {
        run(bot, state).await;
    });
}

async fn run(bot: Bot, state: Arc<BotState>) {
    let mut tick = interval(Duration::from_secs(TICK_SECS));
    let mut morning = DailyJob::new(MORNING_HOUR);
    let mut midweek = DailyJob::new(MIDWEEK_HOUR);
    let mut end_of_week = DailyJob::new(END_OF_WEEK_HOUR);
    let mut sweep = DailyJob::new(SWEEP_HOUR);

    info!("Reminder loop started");

    loop {
        tick.tick().await;
        let now = office_now();
        let day = weekday_index(now);

        if morning.due(now, day.is_some()) {
            run_check(&bot, &state, now, morning_alert).await;
        }
        if midweek.due(now, day == Some(MIDWEEK_DAY)) {
            run_check(&bot, &state, now, midweek_alert).await;
        }
        if end_of_week.due(now, day == Some(END_OF_WEEK_DAY)) {
            run_check(&bot, &state, now, end_of_week_alert).await;
        }
        if sweep.due(now, day == Some(SWEEP_DAY)) {
            run_sweep(&state, now).await;
        }
    }
}

/// Fire-at-most-once-per-day latch for one scheduled job.
struct DailyJob {
    hour: u32,
    last_fired: Option<NaiveDate>,
}

impl DailyJob {
    fn new(hour: u32) -> Self {
        Self {
            hour,
            last_fired: None,
        }
    }

    /// True exactly once per matching day, during the scheduled hour.
    fn due(&mut self, now: DateTime<FixedOffset>, day_matches: bool) -> bool {
        let today = now.date_naive();
        if !day_matches || now.hour() != self.hour || self.last_fired == Some(today) {
            return false;
        }
        self.last_fired = Some(today);
        true
    }
}

/// Weekday index of `now` (0 = Monday), or `None` on weekends.
fn weekday_index(now: DateTime<FixedOffset>) -> Option<u8> {
    let day = now.weekday().num_days_from_monday();
    (day < 5).then_some(day as u8)
}

/// Load a snapshot, evaluate one check, broadcast any alert.
async fn run_check(
    bot: &Bot,
    state: &BotState,
    now: DateTime<FixedOffset>,
    check: fn(&ScheduleDoc, DateTime<FixedOffset>, usize) -> Option<String>,
) {
    let doc = {
        let store = state.store().await;
        match store.load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Failed to load schedule for reminder");
                return;
            }
        }
    };

    let Some(text) = check(&doc, now, state.min_people()) else {
        return;
    };

    let outcomes = broadcast(bot, &doc.broadcast_chats, &text).await;
    let delivered = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
    for (chat_id, result) in &outcomes {
        if let Err(e) = result {
            warn!(chat_id, error = %e, "Reminder delivery failed");
        }
    }
    info!(delivered, total = outcomes.len(), "Reminder broadcast done");
}

/// Best-effort broadcast: every chat is attempted independently and the
/// per-chat outcomes are returned to the caller; one failure never
/// aborts the batch.
async fn broadcast(bot: &Bot, chats: &[i64], text: &str) -> Vec<(i64, Result<(), String>)> {
    let mut outcomes = Vec::with_capacity(chats.len());
    for &chat_id in chats {
        let result = bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string());
        outcomes.push((chat_id, result));
    }
    outcomes
}

/// Retention sweep: discard week records older than the horizon.
async fn run_sweep(state: &BotState, now: DateTime<FixedOffset>) {
    let cutoff = week_key(now - chrono::Duration::weeks(RETENTION_WEEKS));
    let store = state.store().await;
    match store.sweep_before(&cutoff) {
        Ok(0) => {}
        Ok(removed) => info!(removed, cutoff = %cutoff, "Old week records removed"),
        Err(e) => warn!(error = %e, "Retention sweep failed"),
    }
}

// ---------------------------------------------------------------------
// Pure alert checks
// ---------------------------------------------------------------------

/// Workday-morning check: alert when today's headcount is below the
/// minimum.
pub fn morning_alert(
    doc: &ScheduleDoc,
    now: DateTime<FixedOffset>,
    min_people: usize,
) -> Option<String> {
    let today = weekday_index(now)?;
    let week = week_key(now);
    let status = week_status(doc, &week, min_people)
        .ok()?
        .into_iter()
        .find(|s| s.day == today)?;
    if !status.is_deficit() {
        return None;
    }
    Some(format!(
        "🚨 Today is {} and only {} signed up for the office.\n\
        We need {} more! Who's coming in?\n\n\
        /set {} or just tell me \"I'll be in today\" 🪑🔥",
        day_full_name(today),
        status.count(),
        status.shortfall,
        day_abbrev(today),
    ))
}

/// Mid-week check: the remainder of this week plus all of next week;
/// suppressed when both are fully covered.
pub fn midweek_alert(
    doc: &ScheduleDoc,
    now: DateTime<FixedOffset>,
    min_people: usize,
) -> Option<String> {
    let this = week_key(now);
    let next = week_key(now + chrono::Duration::weeks(1));
    let rest_of_week = deficit_days(doc, &this, min_people, MIDWEEK_DAY + 1).ok()?;
    let next_week = deficit_days(doc, &next, min_people, 0).ok()?;
    if rest_of_week.is_empty() && next_week.is_empty() {
        return None;
    }

    let mut lines = vec!["📋 Mid-week check!\n".to_string()];
    if !rest_of_week.is_empty() {
        lines.push(format!(
            "⚠️ Still open this week: {}",
            day_names(&rest_of_week)
        ));
    }
    if !next_week.is_empty() {
        lines.push(format!("⚠️ Next week: {}", day_names(&next_week)));
        lines.push("\n/setnext or tell me which days you can make 💬".to_string());
    }
    Some(lines.join("\n"))
}

/// End-of-week check: every deficit day of next week; suppressed when
/// there are none.
pub fn end_of_week_alert(
    doc: &ScheduleDoc,
    now: DateTime<FixedOffset>,
    min_people: usize,
) -> Option<String> {
    let next = week_key(now + chrono::Duration::weeks(1));
    let open = deficit_days(doc, &next, min_people, 0).ok()?;
    if open.is_empty() {
        return None;
    }
    Some(format!(
        "🔥 It's Friday! Don't forget about next week.\n\n\
        Still open: {}\n\n\
        /setnext or tell me \"next week I'll be in on ...\"",
        day_names(&open),
    ))
}

fn day_names(days: &[DayStatus]) -> String {
    days.iter()
        .map(|d| day_abbrev(d.day))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hotseat_models::{office_tz, WeekKey};

    const MIN: usize = 2;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        office_tz().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // Week of 2026-08-03 (Mon) .. 2026-08-07 (Fri); next week 2026-08-10.
    fn this_week() -> WeekKey {
        WeekKey::from("2026-08-03")
    }

    fn next_week() -> WeekKey {
        WeekKey::from("2026-08-10")
    }

    fn fully_covered(doc: &mut ScheduleDoc, week: &WeekKey) {
        doc.set_days("1", "Alice", &[0, 1, 2, 3, 4], week);
        doc.set_days("2", "Bob", &[0, 1, 2, 3, 4], week);
    }

    #[test]
    fn test_morning_alert_on_deficit_day() {
        let mut doc = ScheduleDoc::default();
        doc.set_days("1", "Alice", &[1], &this_week());

        // Tuesday 09:00 with one person signed up.
        let alert = morning_alert(&doc, at(2026, 8, 4, 9), MIN).unwrap();
        assert!(alert.contains("Tuesday"));
        assert!(alert.contains("only 1 signed up"));
        assert!(alert.contains("We need 1 more"));
        assert!(alert.contains("/set Tue"));
    }

    #[test]
    fn test_morning_alert_suppressed_when_covered() {
        let mut doc = ScheduleDoc::default();
        fully_covered(&mut doc, &this_week());

        assert_eq!(morning_alert(&doc, at(2026, 8, 4, 9), MIN), None);
    }

    #[test]
    fn test_morning_alert_suppressed_on_weekend() {
        let doc = ScheduleDoc::default();
        // Saturday.
        assert_eq!(morning_alert(&doc, at(2026, 8, 8, 9), MIN), None);
    }

    #[test]
    fn test_midweek_alert_covers_both_weeks() {
        let mut doc = ScheduleDoc::default();
        // Thursday covered, Friday not; next week empty.
        doc.set_days("1", "Alice", &[3], &this_week());
        doc.set_days("2", "Bob", &[3], &this_week());

        // Wednesday noon.
        let alert = midweek_alert(&doc, at(2026, 8, 5, 12), MIN).unwrap();
        // Thursday is covered, so only Friday remains for this week.
        assert!(alert
            .lines()
            .any(|l| l == "⚠️ Still open this week: Fri"));
        assert!(alert.contains("Next week: Mon, Tue, Wed, Thu, Fri"));
    }

    #[test]
    fn test_midweek_alert_suppressed_when_everything_covered() {
        let mut doc = ScheduleDoc::default();
        fully_covered(&mut doc, &this_week());
        fully_covered(&mut doc, &next_week());

        assert_eq!(midweek_alert(&doc, at(2026, 8, 5, 12), MIN), None);
    }

    #[test]
    fn test_end_of_week_alert_lists_open_days_then_clears() {
        let mut doc = ScheduleDoc::default();
        fully_covered(&mut doc, &next_week());
        // Reopen Friday: Bob drops to Monday only.
        doc.set_days("2", "Bob", &[0, 1, 2, 3], &next_week());
        doc.set_days("1", "Alice", &[0, 1, 2, 3], &next_week());

        let friday = at(2026, 8, 7, 15);
        let alert = end_of_week_alert(&doc, friday, MIN).unwrap();
        assert!(alert.contains("Still open: Fri"));

        // Two members cover Friday; a repeated sweep stays quiet.
        doc.set_days("1", "Alice", &[0, 1, 2, 3, 4], &next_week());
        doc.set_days("3", "Carol", &[4], &next_week());
        assert_eq!(end_of_week_alert(&doc, friday, MIN), None);
    }

    #[test]
    fn test_daily_job_fires_once_per_day_within_hour() {
        let mut job = DailyJob::new(9);

        assert!(!job.due(at(2026, 8, 4, 8), true));
        assert!(job.due(at(2026, 8, 4, 9), true));
        // Same hour, same day: already fired.
        assert!(!job.due(at(2026, 8, 4, 9), true));
        // Past the hour: missed, not fired late.
        assert!(!job.due(at(2026, 8, 4, 10), true));
        // Next matching day fires again.
        assert!(job.due(at(2026, 8, 5, 9), true));
        // Day filter wins.
        assert!(!job.due(at(2026, 8, 6, 9), false));
    }

    #[test]
    fn test_weekday_index() {
        assert_eq!(weekday_index(at(2026, 8, 3, 9)), Some(0));
        assert_eq!(weekday_index(at(2026, 8, 7, 9)), Some(4));
        assert_eq!(weekday_index(at(2026, 8, 8, 9)), None);
        assert_eq!(weekday_index(at(2026, 8, 9, 9)), None);
    }
}
