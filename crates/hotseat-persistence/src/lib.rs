//! Persistence layer for Hotseat.
//!
//! The whole schedule lives in one JSON document, rewritten in full on
//! every mutation via an atomic write (temp file, then rename). Every
//! store operation is reload-mutate-save; nothing is cached across
//! calls, so a single process always reads its own writes.
//!
//! # Example
//!
//! ```no_run
//! use hotseat_persistence::ScheduleStore;
//! use hotseat_models::WeekKey;
//!
//! let store = ScheduleStore::new("/home/user/.hotseat/schedule.json");
//! store.set_days("42", "Alice", &[0, 2], &WeekKey::from("2026-08-03")).unwrap();
//! ```

pub mod atomic;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::ScheduleStore;
