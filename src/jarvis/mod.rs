//! Jarvis, the coaching assistant: context snapshot, prompt assembly and
//! the chat-completion client.

pub mod context;
pub mod llm_client;
pub mod prompt;
pub mod snippet;

use serde::{Deserialize, Serialize};

pub use context::{get_context, JarvisContext};
pub use llm_client::{LlmClient, LlmError};

/// Most recent chat messages forwarded per turn.
pub const HISTORY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
