//! OpenRouter API client for chat completions.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AgentError, Result};
use crate::prompt::{build_context, SYSTEM_PROMPT};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// OpenRouter chat completions endpoint.
const API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Reply length cap; the assistant is told to keep it short anyway.
const MAX_TOKENS: u32 = 400;

const TEMPERATURE: f32 = 0.8;

/// Client for the chat-completions API.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Create a client with an explicit key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a client from the environment, or `None` when no API key
    /// is set (the bot then runs in command-only mode).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok()?;
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(api_key, model))
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the assistant about a user message, grounded in the current
    /// schedule snapshot. Returns the raw reply text, directive line
    /// included; the caller parses and strips it.
    pub async fn chat(
        &self,
        user_message: &str,
        user_name: &str,
        now_line: &str,
        schedule: &str,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::system(build_context(user_name, now_line, schedule)),
                ChatMessage::user(user_message),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        trace!(model = %self.model, "Sending chat request");

        let response = self
            .client
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParse(e.to_string()))?;

        debug!(
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat response received"
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(AgentError::EmptyResponse)
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "See you Monday!"}}],
            "usage": {"total_tokens": 42}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("See you Monday!")
        );
        assert_eq!(response.usage.unwrap().total_tokens, 42);
    }

    #[test]
    fn test_response_tolerates_missing_usage() {
        let json = r#"{"choices": []}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices.is_empty());
        assert!(response.usage.is_none());
    }
}
