//! Language-model collaborator for Hotseat.
//!
//! Free-text messages go to a chat-completions API together with the
//! member's name and a textual schedule snapshot. The model replies
//! conversationally and may append one machine-parseable directive line
//! proposing a schedule change; the directive is parsed out here and
//! the caller decides whether to act on it (after user confirmation).
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY`: enables free-text chat; absent means
//!   command-only mode
//! - `OPENROUTER_MODEL`: model override (default: openai/gpt-4o-mini)

pub mod client;
pub mod directive;
pub mod error;
pub mod prompt;

pub use client::LlmClient;
pub use directive::{parse_directive, strip_directive, Directive, WeekTarget};
pub use error::{AgentError, Result};
