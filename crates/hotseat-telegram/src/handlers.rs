//! Command, free-text and confirmation-button handlers.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, User,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use hotseat_agent::{parse_directive, strip_directive, Directive, WeekTarget};
use hotseat_models::{
    current_week_key, day_full_name, day_list, deficit_days, format_problem_days, format_week,
    next_week_key, office_now, parse_days, schedule_summary, week_key, ClearOutcome, ScheduleDoc,
    WeekKey, WEEKDAYS,
};

use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Mark office days this week: /set Mon Wed Fri")]
    Set(String),

    #[command(description = "Mark office days next week: /setnext Tue Thu")]
    Setnext(String),

    #[command(description = "Remove your days for this week")]
    Clear,

    #[command(description = "Remove your days for next week")]
    Clearnext,

    #[command(description = "Show this week's schedule")]
    Week,

    #[command(description = "Show next week's schedule")]
    Next,

    #[command(description = "Show days still below the minimum")]
    Status,

    #[command(description = "Toggle reminders for this chat")]
    Remind,
}

/// Dispatch commands to the matching handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Set(args) => {
            do_set(bot, msg, state, current_week_key(), "this week", args).await
        }
        Command::Setnext(args) => {
            do_set(bot, msg, state, next_week_key(), "next week", args).await
        }
        Command::Clear => do_clear(bot, msg, state, current_week_key(), "this week").await,
        Command::Clearnext => do_clear(bot, msg, state, next_week_key(), "next week").await,
        Command::Week => handle_week(bot, msg, state).await,
        Command::Next => handle_next(bot, msg, state).await,
        Command::Status => handle_status(bot, msg, state).await,
        Command::Remind => handle_remind(bot, msg, state).await,
    }
}

/// Handle /start.
async fn handle_start(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    register_if_group(&state, &msg).await;

    let text = format!(
        "🔥 Hotseat — office attendance, coordinated!\n\n\
        Commands:\n\
        • /set Mon Wed Fri — mark your days (this week)\n\
        • /setnext Tue Thu — days for next week\n\
        • /clear /clearnext — remove your days\n\
        • /week /next — the schedule\n\
        • /status — days still uncovered\n\
        • /remind — toggle reminders for this chat\n\n\
        Or just write to me:\n\
        • \"Sign me up for Monday and Wednesday\"\n\
        • \"Who's in tomorrow?\"\n\
        • \"Swap my Friday for Thursday\"\n\n\
        In a group, mention me or reply to one of my messages.\n\
        Goal: at least {} people every weekday 💪",
        state.min_people()
    );

    bot.send_message(msg.chat.id, text).await?;
    info!(chat_id = %msg.chat.id, "Help shown");
    Ok(())
}

/// Handle /help.
async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Shared body of /set and /setnext.
async fn do_set(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    week: WeekKey,
    label: &str,
    args: String,
) -> ResponseResult<()> {
    register_if_group(&state, &msg).await;

    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.is_empty() {
        bot.send_message(msg.chat.id, "Tell me which days: /set Mon Wed Fri")
            .await?;
        return Ok(());
    }
    let Some(days) = parse_days(tokens) else {
        bot.send_message(
            msg.chat.id,
            "I didn't recognize those days. Use: Mon, Tue, Wed, Thu, Fri",
        )
        .await?;
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let uid = user.id.to_string();
    let name = display_name(user);
    let result = {
        let store = state.store().await;
        store.set_days(&uid, &name, &days, &week)
    };

    match result {
        Ok(()) => {
            bot.send_message(
                msg.chat.id,
                format!("✅ {name} will be in the office {label}: {}", day_list(&days)),
            )
            .await?;
            info!(chat_id = %msg.chat.id, uid = %uid, week = %week, ?days, "Days set");
            send_deficit_followup(&bot, msg.chat.id, &state, &week, label).await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ Could not save your days: {e}"))
                .await?;
            error!(chat_id = %msg.chat.id, error = %e, "Set failed");
        }
    }
    Ok(())
}

/// Shared body of /clear and /clearnext.
async fn do_clear(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    week: WeekKey,
    label: &str,
) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let uid = user.id.to_string();
    let outcome = {
        let store = state.store().await;
        store.clear_days(&uid, &week)
    };

    let reply = match outcome {
        Ok(ClearOutcome::Cleared) => {
            info!(chat_id = %msg.chat.id, uid = %uid, week = %week, "Days cleared");
            format!("🗑 Your days for {label} are removed.")
        }
        Ok(ClearOutcome::NothingToClear) => {
            format!("You have no days recorded for {label} anyway.")
        }
        Err(e) => {
            error!(chat_id = %msg.chat.id, error = %e, "Clear failed");
            format!("❌ Could not update the schedule: {e}")
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle /week.
async fn handle_week(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    register_if_group(&state, &msg).await;
    send_week(&bot, msg.chat.id, &state, current_week_key(), "This week: ").await
}

/// Handle /next.
async fn handle_next(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    send_week(&bot, msg.chat.id, &state, next_week_key(), "Next week: ").await
}

async fn send_week(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    week: WeekKey,
    label: &str,
) -> ResponseResult<()> {
    let doc = match load_doc(state).await {
        Ok(doc) => doc,
        Err(text) => {
            bot.send_message(chat_id, text).await?;
            return Ok(());
        }
    };
    match format_week(&doc, &week, label, state.min_people()) {
        Ok(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Err(e) => {
            warn!(week = %week, error = %e, "Week rendering failed");
            bot.send_message(chat_id, "❌ Could not render that week.").await?;
        }
    }
    Ok(())
}

/// Handle /status: problems-only view of the current and next week.
async fn handle_status(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let doc = match load_doc(&state).await {
        Ok(doc) => doc,
        Err(text) => {
            bot.send_message(msg.chat.id, text).await?;
            return Ok(());
        }
    };

    let this = format_problem_days(&doc, &current_week_key(), state.min_people());
    let next = format_problem_days(&doc, &next_week_key(), state.min_people());
    match (this, next) {
        (Ok(this), Ok(next)) => {
            bot.send_message(
                msg.chat.id,
                format!("📊 This week:\n{this}\n\n📊 Next week:\n{next}"),
            )
            .await?;
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Status rendering failed");
            bot.send_message(msg.chat.id, "❌ Could not render the status.")
                .await?;
        }
    }
    Ok(())
}

/// Handle /remind: toggle reminder opt-in for the invoking chat.
async fn handle_remind(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let result = {
        let store = state.store().await;
        store.toggle_chat(msg.chat.id.0)
    };
    let reply = match result {
        Ok(true) => {
            info!(chat_id = %msg.chat.id, "Reminders enabled");
            "🔔 Reminders enabled for this chat."
        }
        Ok(false) => {
            info!(chat_id = %msg.chat.id, "Reminders disabled");
            "🔕 Reminders disabled for this chat."
        }
        Err(e) => {
            error!(chat_id = %msg.chat.id, error = %e, "Remind toggle failed");
            "❌ Could not update reminder settings."
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle free text: forward to the language model, surface any
/// proposed action behind confirm/cancel buttons.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(raw_text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    let text = if msg.chat.is_private() {
        raw_text.to_string()
    } else {
        register_if_group(&state, &msg).await;
        let is_reply_to_bot = msg
            .reply_to_message()
            .and_then(|m| m.from.as_ref())
            .map(|u| u.id.0 == state.identity().user_id)
            .unwrap_or(false);
        match addressed_text(raw_text, is_reply_to_bot, &state.identity().username) {
            Some(t) => t,
            // Group chatter not aimed at the bot.
            None => return Ok(()),
        }
    };
    if text.is_empty() {
        return Ok(());
    }

    let Some(llm) = state.llm() else {
        bot.send_message(
            msg.chat.id,
            "🤖 Free-text chat is off (no language-model key configured).\n\
            The commands still work: /set, /week, /status",
        )
        .await?;
        return Ok(());
    };

    // Snapshot the schedule before the network call; the store lock is
    // not held while waiting on the model.
    let doc = match load_doc(&state).await {
        Ok(doc) => doc,
        Err(reply) => {
            bot.send_message(msg.chat.id, reply).await?;
            return Ok(());
        }
    };

    let now = office_now();
    let schedule = match schedule_summary(&doc, now, state.min_people()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Schedule summary failed");
            return Ok(());
        }
    };
    let name = display_name(&user);

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    let reply = match llm.chat(&text, &name, &now_line(now), &schedule).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(chat_id = %msg.chat.id, error = %e, "Language-model call failed");
            bot.send_message(
                msg.chat.id,
                "😵 I couldn't reach my brain just now. Try the commands: /set, /week",
            )
            .await?;
            return Ok(());
        }
    };

    let directive = parse_directive(&reply);
    let clean = strip_directive(&reply);

    let Some(directive) = directive else {
        if !clean.is_empty() {
            bot.send_message(msg.chat.id, clean).await?;
        }
        return Ok(());
    };

    let uid = user.id.to_string();
    let (question, payload) = describe_proposal(&directive, &uid, now);
    debug!(chat_id = %msg.chat.id, uid = %uid, ?directive, "Proposing action");

    let prompt = if clean.is_empty() {
        question
    } else {
        format!("{clean}\n\n{question}")
    };
    bot.send_message(msg.chat.id, prompt)
        .reply_markup(confirm_keyboard(&payload))
        .await?;
    Ok(())
}

/// Handle confirmation-button presses.
///
/// The payload fully encodes the action and the proposing user; only
/// that user can commit it.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let Some(action) = decode_payload(&data) else {
        warn!(data = %data, "Unparseable callback payload");
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if !confirmed_by_proposer(&action, &q.from.id.to_string()) {
        bot.answer_callback_query(q.id)
            .text("This button isn't for you 😏")
            .show_alert(true)
            .await?;
        return Ok(());
    }
    bot.answer_callback_query(q.id.clone()).await?;

    let message = q
        .message
        .as_ref()
        .and_then(|m| m.regular_message())
        .cloned();

    match action {
        PendingAction::Cancel => {
            if let Some(msg) = message {
                let base = base_text(&msg);
                bot.edit_message_text(msg.chat.id, msg.id, format!("{base}\n\n❌ Canceled."))
                    .await?;
            }
            info!(uid = %q.from.id, "Proposal canceled");
        }
        PendingAction::Set { uid, days, week } => {
            let name = display_name(&q.from);
            let label = week_label(&week);
            let result = {
                let store = state.store().await;
                store.set_days(&uid, &name, &days, &week)
            };
            let outcome = match result {
                Ok(()) => {
                    info!(uid = %uid, week = %week, ?days, "Proposal committed");
                    format!("✅ {name} will be in the office {label}: {}", day_list(&days))
                }
                Err(e) => {
                    error!(uid = %uid, error = %e, "Proposal commit failed");
                    format!("❌ Could not save: {e}")
                }
            };
            if let Some(msg) = message {
                let base = base_text(&msg);
                bot.edit_message_text(msg.chat.id, msg.id, format!("{base}\n\n{outcome}"))
                    .await?;
                send_deficit_followup(&bot, msg.chat.id, &state, &week, label).await?;
            }
        }
        PendingAction::Clear { uid, week } => {
            let label = week_label(&week);
            let result = {
                let store = state.store().await;
                store.clear_days(&uid, &week)
            };
            let outcome = match result {
                Ok(ClearOutcome::Cleared) => {
                    info!(uid = %uid, week = %week, "Proposal committed");
                    format!("🗑 Your days for {label} are removed.")
                }
                Ok(ClearOutcome::NothingToClear) => {
                    format!("You have no days recorded for {label} anyway.")
                }
                Err(e) => {
                    error!(uid = %uid, error = %e, "Proposal commit failed");
                    format!("❌ Could not save: {e}")
                }
            };
            if let Some(msg) = message {
                let base = base_text(&msg);
                bot.edit_message_text(msg.chat.id, msg.id, format!("{base}\n\n{outcome}"))
                    .await?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------

/// Confirmation actions carried in callback payloads:
/// `set:<uid>:<d,d,...>:<week-key>`, `clear:<uid>:<week-key>`,
/// `cancel`. The payload is the whole state of the propose/confirm
/// interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Set {
        uid: String,
        days: Vec<u8>,
        week: WeekKey,
    },
    Clear {
        uid: String,
        week: WeekKey,
    },
    Cancel,
}

/// Encode a SET proposal into a callback payload.
pub fn encode_set(uid: &str, days: &[u8], week: &WeekKey) -> String {
    let days: Vec<String> = days.iter().map(u8::to_string).collect();
    format!("set:{uid}:{}:{week}", days.join(","))
}

/// Encode a CLEAR proposal into a callback payload.
pub fn encode_clear(uid: &str, week: &WeekKey) -> String {
    format!("clear:{uid}:{week}")
}

/// Decode a callback payload, rejecting anything malformed.
pub fn decode_payload(data: &str) -> Option<PendingAction> {
    if data == "cancel" {
        return Some(PendingAction::Cancel);
    }
    let fields: Vec<&str> = data.split(':').collect();
    match fields.as_slice() {
        ["set", uid, days, week] => {
            let days: Option<Vec<u8>> = days
                .split(',')
                .map(|d| d.parse::<u8>().ok().filter(|&d| (d as usize) < WEEKDAYS))
                .collect();
            let week = WeekKey::from(*week);
            week.monday().ok()?;
            Some(PendingAction::Set {
                uid: uid.to_string(),
                days: days?,
                week,
            })
        }
        ["clear", uid, week] => {
            let week = WeekKey::from(*week);
            week.monday().ok()?;
            Some(PendingAction::Clear {
                uid: uid.to_string(),
                week,
            })
        }
        _ => None,
    }
}

/// A confirmation may only be committed by the user who proposed it.
pub fn confirmed_by_proposer(action: &PendingAction, from_uid: &str) -> bool {
    match action {
        PendingAction::Set { uid, .. } | PendingAction::Clear { uid, .. } => uid == from_uid,
        PendingAction::Cancel => true,
    }
}

/// In group chats the bot only engages when explicitly addressed: an
/// @-mention anywhere in the text, or a direct reply to one of its own
/// messages. Returns the text with the mention stripped.
pub fn addressed_text(text: &str, is_reply_to_bot: bool, bot_username: &str) -> Option<String> {
    let mention = format!("@{bot_username}");
    if !text.contains(&mention) && !is_reply_to_bot {
        return None;
    }
    Some(text.replace(&mention, "").trim().to_string())
}

/// Build the confirmation question and callback payload for a
/// directive proposed by `uid`.
pub fn describe_proposal(
    directive: &Directive,
    uid: &str,
    now: DateTime<FixedOffset>,
) -> (String, String) {
    match directive {
        Directive::Set { days, week } => {
            let (wk, label) = resolve_target(*week, now);
            (
                format!("📝 Sign you up for {label}: {}?", day_list(days)),
                encode_set(uid, days, &wk),
            )
        }
        Directive::Clear { week } => {
            let (wk, label) = resolve_target(*week, now);
            (
                format!("🗑 Remove all your days for {label}?"),
                encode_clear(uid, &wk),
            )
        }
    }
}

/// Resolve a directive's week target against the given time.
fn resolve_target(week: WeekTarget, now: DateTime<FixedOffset>) -> (WeekKey, &'static str) {
    match week {
        WeekTarget::This => (week_key(now), "this week"),
        WeekTarget::Next => (week_key(now + Duration::weeks(1)), "next week"),
    }
}

fn week_label(week: &WeekKey) -> &'static str {
    if *week == current_week_key() {
        "this week"
    } else {
        "next week"
    }
}

/// Display name preferring "First Last", then first name, username,
/// raw id.
fn display_name(user: &User) -> String {
    if let Some(last) = &user.last_name {
        return format!("{} {last}", user.first_name);
    }
    if !user.first_name.is_empty() {
        return user.first_name.clone();
    }
    user.username
        .clone()
        .unwrap_or_else(|| user.id.to_string())
}

/// The "Now: ..." line grounding the model in the office clock.
fn now_line(now: DateTime<FixedOffset>) -> String {
    use chrono::Datelike;
    let weekday = now.weekday().num_days_from_monday();
    let day = if weekday < 5 {
        day_full_name(weekday as u8)
    } else {
        "the weekend"
    };
    format!("Now: {day}, {}", now.format("%d.%m.%Y %H:%M"))
}

/// The prompt text above its final question paragraph.
fn base_text(msg: &Message) -> String {
    msg.text()
        .map(|t| match t.rsplit_once("\n\n") {
            Some((head, _)) => head.to_string(),
            None => t.to_string(),
        })
        .unwrap_or_default()
}

fn confirm_keyboard(payload: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Yes, do it", payload.to_string()),
        InlineKeyboardButton::callback("❌ No, cancel", "cancel".to_string()),
    ]])
}

/// Auto-register non-private chats for proactive reminders.
async fn register_if_group(state: &BotState, msg: &Message) {
    if !msg.chat.is_private() {
        let store = state.store().await;
        if let Err(e) = store.register_chat(msg.chat.id.0) {
            warn!(chat_id = %msg.chat.id, error = %e, "Failed to register chat");
        }
    }
}

/// Load a fresh document snapshot, mapping store failures to a
/// user-facing reply.
async fn load_doc(state: &BotState) -> std::result::Result<ScheduleDoc, String> {
    let store = state.store().await;
    store.load().map_err(|e| {
        error!(error = %e, "Failed to load schedule");
        format!("❌ Could not read the schedule: {e}")
    })
}

/// After a successful sign-up, warn if the target week still has
/// deficit days.
async fn send_deficit_followup(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    week: &WeekKey,
    label: &str,
) -> ResponseResult<()> {
    let doc = match load_doc(state).await {
        Ok(doc) => doc,
        Err(_) => return Ok(()),
    };
    let open = match deficit_days(&doc, week, state.min_people(), 0) {
        Ok(open) => open,
        Err(_) => return Ok(()),
    };
    if open.is_empty() {
        return Ok(());
    }
    if let Ok(text) = format_problem_days(&doc, week, state.min_people()) {
        bot.send_message(chat_id, format!("⚠️ Still short {label}:\n{text}"))
            .await?;
    }
    Ok(())
}
