//! Runtime configuration for the Hotseat bot.
//!
//! # Environment Variables
//!
//! - `BOT_TOKEN`: Telegram bot token (required)
//! - `HOTSEAT_STATE_DIR`: override the state directory

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "HOTSEAT_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".hotseat";

/// File name of the schedule document inside the state directory.
const SCHEDULE_FILE: &str = "schedule.json";

/// Minimum number of people required in the office per weekday.
pub const MIN_PEOPLE: usize = 2;

/// Weeks of history kept before the retention sweep discards a record.
pub const RETENTION_WEEKS: i64 = 4;

/// Hour (office time) of the workday-morning deficit check.
pub const MORNING_HOUR: u32 = 9;

/// Weekday index of the mid-week check (Wednesday).
pub const MIDWEEK_DAY: u8 = 2;

/// Hour of the mid-week check.
pub const MIDWEEK_HOUR: u32 = 12;

/// Weekday index of the end-of-week check (Friday).
pub const END_OF_WEEK_DAY: u8 = 4;

/// Hour of the end-of-week check.
pub const END_OF_WEEK_HOUR: u32 = 15;

/// Weekday index of the retention sweep (Monday).
pub const SWEEP_DAY: u8 = 0;

/// Hour of the retention sweep.
pub const SWEEP_HOUR: u32 = 3;

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Hotseat state directory.
///
/// Resolution order:
/// 1. `HOTSEAT_STATE_DIR` environment variable if set
/// 2. `~/.hotseat` if a home directory is available
/// 3. `.hotseat` in the current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Path of the persisted schedule document.
pub fn schedule_file() -> PathBuf {
    state_dir().join(SCHEDULE_FILE)
}
