//! Anthropic Messages API client with streamed output.
//!
//! Thin HTTP wrapper for `/v1/messages` with `stream: true`. Text arrives in
//! `content_block_delta` events; `message_stop` ends the stream. Pure parsing
//! in `parse_event` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::sse::{Chunk, SseEvent, text_stream};
use super::types::{LlmError, Message, Role, TextStream};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(api_key: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key })
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-200.
    pub async fn stream_chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<TextStream, LlmError> {
        let (system, turns) = split_system(system, messages);
        let body = ApiRequest { model, max_tokens, system: &system, messages: &turns, stream: true };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body: text });
        }

        Ok(text_stream(response.bytes_stream(), parse_event))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [&'a Message],
    stream: bool,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// The Messages API takes the system prompt out of band, so system turns in
/// the history are folded into it.
fn split_system<'a>(system: &str, messages: &'a [Message]) -> (String, Vec<&'a Message>) {
    let mut prompt = system.trim().to_string();
    let mut turns = Vec::with_capacity(messages.len());
    for message in messages {
        if message.role == Role::System {
            if !prompt.is_empty() {
                prompt.push_str("\n\n");
            }
            prompt.push_str(message.content.trim());
        } else {
            turns.push(message);
        }
    }
    (prompt, turns)
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_event(event: &SseEvent) -> Result<Chunk, LlmError> {
    if event.data.trim().is_empty() {
        return Ok(Chunk::Skip);
    }
    let parsed: StreamEvent = serde_json::from_str(&event.data).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    match parsed {
        StreamEvent::ContentBlockDelta { delta: Delta::TextDelta { text } } => Ok(Chunk::Text(text)),
        StreamEvent::ContentBlockDelta { delta: Delta::Other } | StreamEvent::Other => Ok(Chunk::Skip),
        StreamEvent::MessageStop => Ok(Chunk::Done),
        StreamEvent::Error { error } => Err(LlmError::StreamError(error.message)),
    }
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
