//! Telegram bot interface for Hotseat.
//!
//! Hotseat coordinates weekly office-attendance sign-ups for a small
//! team, keeping at least [`config::MIN_PEOPLE`] people in the office
//! every weekday and nudging the chats that opted into reminders.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: bot token from @BotFather
//!
//! Optional:
//! - `OPENROUTER_API_KEY`: enables free-text chat; without it the bot
//!   runs in command-only mode
//! - `OPENROUTER_MODEL`: chat model override
//! - `HOTSEAT_STATE_DIR`: where the schedule document lives
//!   (default: `~/.hotseat`)
//!
//! # Commands
//!
//! - `/start`, `/help` - help text
//! - `/set Mon Wed Fri` - mark office days for this week
//! - `/setnext Tue Thu` - mark office days for next week
//! - `/clear`, `/clearnext` - remove your days
//! - `/week`, `/next` - show a week's schedule
//! - `/status` - days still below the minimum
//! - `/remind` - toggle reminders for the invoking chat
//!
//! Free text also works ("sign me up for Monday and Wednesday"); in
//! group chats the bot only reacts when mentioned or replied to. Any
//! change proposed through free text needs an explicit button
//! confirmation before it touches the schedule.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod reminders;
pub mod state;

pub use bot::HotseatBot;
pub use error::{BotError, Result};
pub use state::{BotIdentity, BotState};
