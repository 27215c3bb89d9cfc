//! The schedule store: reload-mutate-save over one JSON document.

use std::path::PathBuf;

use hotseat_models::{ClearOutcome, ScheduleDoc, WeekKey};
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Persistent store for the schedule document.
///
/// The store is the sole reader and writer of its file. Every operation
/// loads the document from disk, applies one mutation, and writes the
/// whole document back. Callers wanting isolation against concurrent
/// handlers serialize access around the store; the store itself holds
/// no cross-call state beyond the path.
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the document. A missing file is the empty document;
    /// malformed content is an error, not a silent reset.
    pub fn load(&self) -> Result<ScheduleDoc> {
        Ok(read_json_optional(&self.path)?.unwrap_or_default())
    }

    /// Persist the document, rewriting the file in full.
    pub fn save(&self, doc: &ScheduleDoc) -> Result<()> {
        atomic_write_json(&self.path, doc)
    }

    /// Record a member's display name and replace their day set for a
    /// week. Idempotent.
    pub fn set_days(&self, uid: &str, name: &str, days: &[u8], week: &WeekKey) -> Result<()> {
        let mut doc = self.load()?;
        doc.set_days(uid, name, days, week);
        self.save(&doc)?;
        debug!(uid, week = %week, ?days, "Days recorded");
        Ok(())
    }

    /// Remove a member's entry for a week. A no-op outcome leaves the
    /// file untouched.
    pub fn clear_days(&self, uid: &str, week: &WeekKey) -> Result<ClearOutcome> {
        let mut doc = self.load()?;
        match doc.clear_days(uid, week) {
            ClearOutcome::Cleared => {
                self.save(&doc)?;
                Ok(ClearOutcome::Cleared)
            }
            ClearOutcome::NothingToClear => Ok(ClearOutcome::NothingToClear),
        }
    }

    /// Add a chat to the broadcast registry if not already present.
    pub fn register_chat(&self, chat_id: i64) -> Result<()> {
        let mut doc = self.load()?;
        if doc.register_chat(chat_id) {
            self.save(&doc)?;
            debug!(chat_id, "Chat registered for reminders");
        }
        Ok(())
    }

    /// Toggle a chat's broadcast registration; returns the resulting
    /// membership (true when the chat is now registered).
    pub fn toggle_chat(&self, chat_id: i64) -> Result<bool> {
        let mut doc = self.load()?;
        let registered = doc.toggle_chat(chat_id);
        self.save(&doc)?;
        Ok(registered)
    }

    /// Remove every week record whose key sorts strictly before
    /// `cutoff`; saves only when something was removed. Returns the
    /// removed count.
    pub fn sweep_before(&self, cutoff: &WeekKey) -> Result<usize> {
        let mut doc = self.load()?;
        let removed = doc.sweep_before(cutoff);
        if removed > 0 {
            self.save(&doc)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use tempfile::tempdir;

    fn wk(s: &str) -> WeekKey {
        WeekKey::from(s)
    }

    fn store_in(dir: &tempfile::TempDir) -> ScheduleStore {
        ScheduleStore::new(dir.path().join("schedule.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty_doc() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load().unwrap(), ScheduleDoc::default());
    }

    #[test]
    fn test_set_days_persists_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.set_days("1", "Alice", &[0, 2], &wk("2026-08-03")).unwrap();
        let first = store.load().unwrap();

        store.set_days("1", "Alice", &[0, 2], &wk("2026-08-03")).unwrap();
        let second = store.load().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.attendees(&wk("2026-08-03"), 0), vec!["Alice"]);
        assert_eq!(second.names.get("1").map(String::as_str), Some("Alice"));
    }

    #[test]
    fn test_clear_days_reports_noop_without_writing() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.set_days("1", "Alice", &[0], &wk("2026-08-03")).unwrap();
        let before = store.load().unwrap();

        let outcome = store.clear_days("2", &wk("2026-08-03")).unwrap();
        assert_eq!(outcome, ClearOutcome::NothingToClear);
        assert_eq!(store.load().unwrap(), before);

        let outcome = store.clear_days("1", &wk("2026-08-03")).unwrap();
        assert_eq!(outcome, ClearOutcome::Cleared);
        assert!(store.load().unwrap().attendees(&wk("2026-08-03"), 0).is_empty());
    }

    #[test]
    fn test_register_and_toggle_chat() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.register_chat(-100).unwrap();
        store.register_chat(-100).unwrap();
        assert_eq!(store.load().unwrap().broadcast_chats, vec![-100]);

        assert!(!store.toggle_chat(-100).unwrap());
        assert!(store.load().unwrap().broadcast_chats.is_empty());

        assert!(store.toggle_chat(-100).unwrap());
        assert_eq!(store.load().unwrap().broadcast_chats, vec![-100]);
    }

    #[test]
    fn test_sweep_removes_only_older_weeks() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        for key in ["2026-06-29", "2026-07-06", "2026-08-03"] {
            store.set_days("1", "Alice", &[0], &wk(key)).unwrap();
        }

        let removed = store.sweep_before(&wk("2026-07-06")).unwrap();
        assert_eq!(removed, 1);

        let doc = store.load().unwrap();
        assert!(!doc.weeks.contains_key(&wk("2026-06-29")));
        assert!(doc.weeks.contains_key(&wk("2026-07-06")));
        assert!(doc.weeks.contains_key(&wk("2026-08-03")));

        // Nothing left to sweep.
        assert_eq!(store.sweep_before(&wk("2026-07-06")).unwrap(), 0);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, "{broken").unwrap();

        let store = ScheduleStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
    }
}
