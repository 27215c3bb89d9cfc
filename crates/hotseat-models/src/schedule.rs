//! The persisted schedule document.
//!
//! One JSON document with three top-level mappings: week records,
//! member display names, and the broadcast chat registry. The document
//! is rewritten in full on every mutation; mutation logic lives here so
//! it is testable without touching the filesystem.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::days::WEEKDAYS;
use crate::week::WeekKey;

/// Member identifier (Telegram user id rendered as a string).
pub type UserId = String;

/// One week of sign-ups: member id to the weekday indices they attend.
pub type WeekRecord = BTreeMap<UserId, BTreeSet<u8>>;

/// Root persisted object.
///
/// A member absent from a week record attends zero days that week.
/// Week records are created lazily on first sign-up and pruned by the
/// retention sweep; names and chat registrations persist until changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDoc {
    /// Week key to per-member attendance sets.
    #[serde(default)]
    pub weeks: BTreeMap<WeekKey, WeekRecord>,

    /// Member directory; updated opportunistically, never pruned.
    #[serde(default)]
    pub names: BTreeMap<UserId, String>,

    /// Chats opted in to proactive reminders.
    #[serde(default)]
    pub broadcast_chats: Vec<i64>,
}

/// Outcome of clearing a member's week entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// An entry existed and was removed.
    Cleared,
    /// The member had nothing recorded for that week.
    NothingToClear,
}

impl ScheduleDoc {
    /// Display name for a member, falling back to the raw identifier.
    pub fn display_name(&self, uid: &str) -> String {
        self.names
            .get(uid)
            .cloned()
            .unwrap_or_else(|| format!("id:{uid}"))
    }

    /// Record the display name and replace (not merge) the member's day
    /// set for a week, creating the week record if absent. Idempotent.
    ///
    /// Indices outside 0..=4 are dropped.
    pub fn set_days(&mut self, uid: &str, name: &str, days: &[u8], week: &WeekKey) {
        self.names.insert(uid.to_string(), name.to_string());
        let record = self.weeks.entry(week.clone()).or_default();
        record.insert(
            uid.to_string(),
            days.iter()
                .copied()
                .filter(|&d| (d as usize) < WEEKDAYS)
                .collect(),
        );
    }

    /// Remove the member's entry for a week, reporting a distinct no-op
    /// when there was nothing to remove.
    pub fn clear_days(&mut self, uid: &str, week: &WeekKey) -> ClearOutcome {
        match self.weeks.get_mut(week) {
            Some(record) => {
                if record.remove(uid).is_some() {
                    ClearOutcome::Cleared
                } else {
                    ClearOutcome::NothingToClear
                }
            }
            None => ClearOutcome::NothingToClear,
        }
    }

    /// Add a chat to the broadcast registry if not already present.
    /// Returns true when the chat was newly added.
    pub fn register_chat(&mut self, chat_id: i64) -> bool {
        if self.broadcast_chats.contains(&chat_id) {
            return false;
        }
        self.broadcast_chats.push(chat_id);
        true
    }

    /// Toggle a chat's broadcast registration; returns the resulting
    /// membership (true when the chat is now registered).
    pub fn toggle_chat(&mut self, chat_id: i64) -> bool {
        if let Some(pos) = self.broadcast_chats.iter().position(|&c| c == chat_id) {
            self.broadcast_chats.remove(pos);
            false
        } else {
            self.broadcast_chats.push(chat_id);
            true
        }
    }

    /// Drop every week record whose key sorts strictly before `cutoff`.
    /// Returns the number of removed records.
    pub fn sweep_before(&mut self, cutoff: &WeekKey) -> usize {
        let before = self.weeks.len();
        self.weeks.retain(|k, _| k >= cutoff);
        before - self.weeks.len()
    }

    /// Resolved names of members attending `day` of the given week, in
    /// stable member-id order.
    pub fn attendees(&self, week: &WeekKey, day: u8) -> Vec<String> {
        self.weeks
            .get(week)
            .map(|record| {
                record
                    .iter()
                    .filter(|(_, days)| days.contains(&day))
                    .map(|(uid, _)| self.display_name(uid))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wk(s: &str) -> WeekKey {
        WeekKey::from(s)
    }

    #[test]
    fn test_set_days_is_idempotent() {
        let mut a = ScheduleDoc::default();
        a.set_days("1", "Alice", &[0, 2], &wk("2026-08-03"));

        let mut b = a.clone();
        b.set_days("1", "Alice", &[0, 2], &wk("2026-08-03"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_set_days_replaces_not_merges() {
        let mut doc = ScheduleDoc::default();
        doc.set_days("1", "Alice", &[0, 1, 2], &wk("2026-08-03"));
        doc.set_days("1", "Alice", &[4], &wk("2026-08-03"));

        assert_eq!(doc.attendees(&wk("2026-08-03"), 0), Vec::<String>::new());
        assert_eq!(doc.attendees(&wk("2026-08-03"), 4), vec!["Alice"]);
    }

    #[test]
    fn test_set_days_drops_out_of_range_indices() {
        let mut doc = ScheduleDoc::default();
        doc.set_days("1", "Alice", &[1, 9], &wk("2026-08-03"));

        let record = doc.weeks.get(&wk("2026-08-03")).unwrap();
        assert_eq!(record.get("1").unwrap().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_clear_days_reports_noop_and_leaves_doc_unchanged() {
        let mut doc = ScheduleDoc::default();
        doc.set_days("1", "Alice", &[0], &wk("2026-08-03"));
        let snapshot = doc.clone();

        assert_eq!(
            doc.clear_days("2", &wk("2026-08-03")),
            ClearOutcome::NothingToClear
        );
        assert_eq!(
            doc.clear_days("1", &wk("2026-08-10")),
            ClearOutcome::NothingToClear
        );
        assert_eq!(doc, snapshot);

        assert_eq!(doc.clear_days("1", &wk("2026-08-03")), ClearOutcome::Cleared);
        assert!(doc.weeks.get(&wk("2026-08-03")).unwrap().is_empty());
    }

    #[test]
    fn test_register_chat_is_idempotent() {
        let mut doc = ScheduleDoc::default();
        assert!(doc.register_chat(-100));
        assert!(!doc.register_chat(-100));
        assert_eq!(doc.broadcast_chats, vec![-100]);
    }

    #[test]
    fn test_toggle_chat_round_trip() {
        let mut doc = ScheduleDoc::default();
        assert!(doc.toggle_chat(42));
        assert!(!doc.toggle_chat(42));
        assert!(doc.broadcast_chats.is_empty());
    }

    #[test]
    fn test_sweep_removes_strictly_older_keys_only() {
        let mut doc = ScheduleDoc::default();
        for key in ["2026-06-29", "2026-07-06", "2026-07-13", "2026-08-03"] {
            doc.set_days("1", "Alice", &[0], &wk(key));
        }

        let removed = doc.sweep_before(&wk("2026-07-06"));

        assert_eq!(removed, 1);
        assert!(!doc.weeks.contains_key(&wk("2026-06-29")));
        // The cutoff week itself survives.
        assert!(doc.weeks.contains_key(&wk("2026-07-06")));
        assert!(doc.weeks.contains_key(&wk("2026-08-03")));
    }

    #[test]
    fn test_display_name_falls_back_to_raw_id() {
        let doc = ScheduleDoc::default();
        assert_eq!(doc.display_name("77"), "id:77");
    }

    #[test]
    fn test_document_layout_round_trips() {
        let mut doc = ScheduleDoc::default();
        doc.set_days("1", "Alice", &[0, 2], &wk("2026-08-03"));
        doc.register_chat(-100);

        let json = serde_json::to_string_pretty(&doc).unwrap();
        // Three top-level mappings, human-readable.
        assert!(json.contains("\"weeks\""));
        assert!(json.contains("\"names\""));
        assert!(json.contains("\"broadcast_chats\""));

        let loaded: ScheduleDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_missing_mappings_default_to_empty() {
        let doc: ScheduleDoc = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, ScheduleDoc::default());
    }
}
