//! Shared state for the bot, accessible across all handlers.

use hotseat_agent::LlmClient;
use hotseat_persistence::ScheduleStore;
use tokio::sync::{Mutex, MutexGuard};

/// Identity of the bot itself, used for mention and reply detection in
/// group chats.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    /// The bot's @username, without the @.
    pub username: String,
    /// The bot's own Telegram user id.
    pub user_id: u64,
}

/// Shared state for the bot.
///
/// The store sits behind one mutex so handlers and the reminder loop
/// serialize their load-mutate-save cycles. The guard must never be
/// held across a Telegram or language-model await.
pub struct BotState {
    store: Mutex<ScheduleStore>,
    /// `None` runs the bot in command-only mode.
    llm: Option<LlmClient>,
    identity: BotIdentity,
    min_people: usize,
}

impl BotState {
    /// Create the shared state.
    pub fn new(
        store: ScheduleStore,
        llm: Option<LlmClient>,
        identity: BotIdentity,
        min_people: usize,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            llm,
            identity,
            min_people,
        }
    }

    /// Lock the store for one load-mutate-save cycle.
    pub async fn store(&self) -> MutexGuard<'_, ScheduleStore> {
        self.store.lock().await
    }

    /// The language-model client, when configured.
    pub fn llm(&self) -> Option<&LlmClient> {
        self.llm.as_ref()
    }

    /// Whether free-text chat is available.
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// The bot's own identity.
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Required daily headcount.
    pub fn min_people(&self) -> usize {
        self.min_people
    }
}
