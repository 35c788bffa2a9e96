use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::poem::Message;
use crate::providers::errors::{GenerateError, transport_error};

const SYSTEM_PROMPT: &str = "You are a creative poet. Generate beautiful, meaningful poems \
     based on the user's prompt. The poem should be well-structured, emotionally resonant, \
     and demonstrate literary craftsmanship. Format the poem with proper line breaks and stanzas.";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.8;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        })
        .collect()
}

/// One shot, no retries. Classifies the outcome in strict priority order:
/// transport failure, non-200 status, undecodable body, provider-reported
/// error, empty choices, success. Returns the first choice's content
/// verbatim. Deliberately silent; the caller owns outcome logging.
pub async fn generate_poem(
    client: &Client,
    cfg: &Config,
    prompt: &str,
) -> Result<String, GenerateError> {
    let api_url = completions_url(&cfg.base_url);
    let messages = [Message::system(SYSTEM_PROMPT), Message::user(prompt)];
    let body = ChatRequest {
        model: cfg.model.clone(),
        messages: to_chat_messages(&messages),
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    let response = client
        .post(&api_url)
        .bearer_auth(&cfg.api_key)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .json(&body)
        .send()
        .await
        .map_err(|err| transport_error(err, &api_url, cfg.timeout_secs))?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        return Err(GenerateError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    let raw = response
        .text()
        .await
        .map_err(|err| transport_error(err, &api_url, cfg.timeout_secs))?;
    let parsed: ChatResponse = serde_json::from_str(&raw)
        .map_err(|err| GenerateError::MalformedResponse(err.to_string()))?;

    if let Some(api_err) = parsed.error {
        return Err(GenerateError::Api(api_err.message));
    }

    let Some(first) = parsed.choices.into_iter().next() else {
        return Err(GenerateError::EmptyChoices);
    };
    Ok(first.message.content)
}
