//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set the BOT_TOKEN environment variable.")]
    NoToken,

    /// Failed to reach Telegram at startup.
    #[error("failed to contact Telegram: {0}")]
    Startup(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] hotseat_persistence::StoreError),

    /// Domain computation failure.
    #[error(transparent)]
    Model(#[from] hotseat_models::ModelError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
