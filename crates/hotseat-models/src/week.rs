//! Week-key math in the fixed office timezone.
//!
//! A week is identified by the ISO date of its Monday (`YYYY-MM-DD`).
//! Keys are zero-padded, so lexicographic order equals chronological
//! order; the retention sweep relies on this.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Date format used for week keys.
const KEY_FORMAT: &str = "%Y-%m-%d";

/// Offset of the office timezone from UTC, in seconds (UTC+3, no DST).
const OFFICE_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Canonical identifier of a week: its Monday's date as `YYYY-MM-DD`.
///
/// Keys produced by [`week_key`] are always valid dates. Keys decoded
/// from external payloads are validated when [`WeekKey::monday`] is
/// called.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    /// Key of the week containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        WeekKey(monday.format(KEY_FORMAT).to_string())
    }

    /// The Monday this key names.
    pub fn monday(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, KEY_FORMAT)
            .map_err(|_| ModelError::InvalidWeekKey(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WeekKey {
    fn from(s: &str) -> Self {
        WeekKey(s.to_string())
    }
}

/// The fixed office timezone.
pub fn office_tz() -> FixedOffset {
    FixedOffset::east_opt(OFFICE_UTC_OFFSET_SECS).expect("constant offset is in range")
}

/// Current time in the office timezone, sampled fresh on every call.
pub fn office_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&office_tz())
}

/// Key of the week containing `dt`.
pub fn week_key(dt: DateTime<FixedOffset>) -> WeekKey {
    WeekKey::from_date(dt.date_naive())
}

/// Key of the week containing now.
pub fn current_week_key() -> WeekKey {
    week_key(office_now())
}

/// Key of the week after the one containing now.
pub fn next_week_key() -> WeekKey {
    week_key(office_now() + Duration::weeks(1))
}

/// Monday 00:00 of the given week, in the office timezone.
///
/// Round-trips with [`week_key`]: `week_key(monday_of(k)) == k` for
/// every valid key.
pub fn monday_of(key: &WeekKey) -> Result<DateTime<FixedOffset>> {
    let monday = key.monday()?;
    monday
        .and_time(NaiveTime::MIN)
        .and_local_timezone(office_tz())
        .single()
        .ok_or_else(|| ModelError::InvalidWeekKey(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        office_tz().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_key_is_monday() {
        // 2026-08-04 is a Tuesday; its week starts 2026-08-03.
        assert_eq!(week_key(at(2026, 8, 4, 12)).as_str(), "2026-08-03");
        assert_eq!(week_key(at(2026, 8, 3, 0)).as_str(), "2026-08-03");
    }

    #[test]
    fn test_week_key_sunday_belongs_to_preceding_monday() {
        // 2026-08-09 is a Sunday.
        assert_eq!(week_key(at(2026, 8, 9, 23)).as_str(), "2026-08-03");
        // One hour into Monday starts the next week.
        assert_eq!(week_key(at(2026, 8, 10, 1)).as_str(), "2026-08-10");
    }

    #[test]
    fn test_round_trip_stability() {
        for (y, m, d) in [(2026, 8, 4), (2026, 1, 1), (2024, 2, 29), (2025, 12, 31)] {
            let wk = week_key(at(y, m, d, 15));
            let monday = monday_of(&wk).unwrap();
            assert_eq!(week_key(monday), wk);
        }
    }

    #[test]
    fn test_lexicographic_order_is_chronological() {
        let earlier = week_key(at(2026, 2, 4, 9));
        let later = week_key(at(2026, 11, 30, 9));
        assert!(earlier < later);
        assert!(earlier.as_str() < later.as_str());
    }

    #[test]
    fn test_monday_of_rejects_garbage() {
        assert!(monday_of(&WeekKey::from("not-a-date")).is_err());
    }

    #[test]
    fn test_next_week_is_seven_days_later() {
        let now = at(2026, 8, 4, 9);
        let this = week_key(now);
        let next = week_key(now + Duration::weeks(1));
        let gap = next.monday().unwrap() - this.monday().unwrap();
        assert_eq!(gap, Duration::days(7));
    }
}
