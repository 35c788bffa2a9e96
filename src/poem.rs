use reqwest::Client;

use crate::config::Config;
use crate::providers;

pub use crate::providers::errors::GenerateError;

/// Outcome of one generation attempt: the poem text, or a classified failure.
pub type PoemResult = Result<String, GenerateError>;

#[derive(Debug, Clone)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Requests a poem for `prompt`. Exactly one attempt per call; the wire
/// format and failure classification live behind the provider boundary.
pub async fn generate(client: &Client, cfg: &Config, prompt: &str) -> PoemResult {
    providers::openai::generate_poem(client, cfg, prompt).await
}
