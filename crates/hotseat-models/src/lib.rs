//! Domain types and pure computation for Hotseat.
//!
//! Everything in this crate is a pure function of its inputs: week-key
//! math in the fixed office timezone, weekday token parsing, the
//! persisted schedule document, per-day headcount deficits, and the
//! text renderings shared by on-demand queries and scheduled reminders.
//!
//! Functions that need the current time take it as a parameter; the
//! only clock access lives in the thin `current_*`/`office_now`
//! wrappers, so all the interesting logic is testable with fixed
//! timestamps.

pub mod days;
pub mod deficit;
pub mod error;
pub mod format;
pub mod schedule;
pub mod week;

pub use days::{day_abbrev, day_full_name, day_list, parse_days, WEEKDAYS};
pub use deficit::{deficit_days, week_status, DayStatus};
pub use error::{ModelError, Result};
pub use format::{format_problem_days, format_week, schedule_summary, DEFICIT_MARK, OK_MARK};
pub use schedule::{ClearOutcome, ScheduleDoc, UserId, WeekRecord};
pub use week::{
    current_week_key, monday_of, next_week_key, office_now, office_tz, week_key, WeekKey,
};
