//! Error types for the language-model collaborator.

use thiserror::Error;

/// Errors that can occur during a chat-completions call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// HTTP transport failure (including timeouts).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success status from the API.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response did not match the expected shape.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Response contained no reply text.
    #[error("empty response from model")]
    EmptyResponse,
}

/// Result type alias for collaborator operations.
pub type Result<T> = std::result::Result<T, AgentError>;
