//! Bot assembly: dispatcher wiring and startup.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{info, warn};

use hotseat_agent::LlmClient;
use hotseat_persistence::ScheduleStore;

use crate::config;
use crate::error::{BotError, Result};
use crate::handlers::{handle_callback, handle_command, handle_message, Command};
use crate::reminders;
use crate::state::{BotIdentity, BotState};

/// The Hotseat Telegram bot.
pub struct HotseatBot {
    bot: Bot,
    llm: Option<LlmClient>,
}

impl HotseatBot {
    /// Create the bot from the environment.
    ///
    /// Requires `BOT_TOKEN`. A missing language-model key only disables
    /// free-text chat; the commands keep working.
    pub fn new() -> Result<Self> {
        let token = std::env::var(config::BOT_TOKEN_ENV).map_err(|_| BotError::NoToken)?;
        let llm = LlmClient::from_env();
        if llm.is_none() {
            warn!("No language-model key set - free-text chat disabled, commands still work");
        }
        Ok(Self {
            bot: Bot::new(token),
            llm,
        })
    }

    /// Fetch the bot's own identity from Telegram.
    pub async fn identity(&self) -> Result<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::Startup(e.to_string()))?;
        Ok(BotIdentity {
            username: me.username().to_string(),
            user_id: me.user.id.0,
        })
    }

    /// Start long polling; runs until interrupted.
    pub async fn start_polling(self, identity: BotIdentity) -> Result<()> {
        let store = ScheduleStore::new(config::schedule_file());
        let state = Arc::new(BotState::new(
            store,
            self.llm,
            identity,
            config::MIN_PEOPLE,
        ));
        let bot = self.bot;

        reminders::spawn(bot.clone(), Arc::clone(&state));

        let state_for_commands = Arc::clone(&state);
        let state_for_messages = Arc::clone(&state);
        let state_for_callbacks = Arc::clone(&state);

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: teloxide::types::CallbackQuery| {
                    let state = Arc::clone(&state_for_callbacks);
                    async move { handle_callback(bot, q, state).await }
                },
            ))
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Unrecognized /commands, answered in private
                        // chats only so group traffic for other bots
                        // stays untouched.
                        msg.chat.is_private()
                            && msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(move |bot: Bot, msg: Message| async move {
                        if let Some(text) = msg.text() {
                            let cmd = text.split_whitespace().next().unwrap_or(text);
                            bot.send_message(
                                msg.chat.id,
                                format!(
                                    "Unknown command: {cmd}\n\nUse /help to see available commands."
                                ),
                            )
                            .await?;
                        }
                        Ok(())
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        msg.text().map(|t| !t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(bot, handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
