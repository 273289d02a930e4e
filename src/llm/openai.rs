//! OpenAI-compatible chat completions client with streamed output.
//!
//! Posts to `{base_url}/chat/completions` with `stream: true` and reads
//! `choices[0].delta.content` from each event until `[DONE]`. Pure parsing in
//! `parse_event` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::sse::{Chunk, SseEvent, text_stream};
use super::types::{LlmError, Message, Role, TextStream};

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, api_key, base_url })
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
        let msgs = build_messages(system, messages);
        let body = CcRequest { model, max_tokens, messages: &msgs, stream: true };
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
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
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage<'a>],
    stream: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CcMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct CcChunk {
    #[serde(default)]
    choices: Vec<CcChoice>,
    error: Option<CcError>,
}

#[derive(Deserialize)]
struct CcChoice {
    #[serde(default)]
    delta: CcDelta,
}

#[derive(Deserialize, Default)]
struct CcDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CcError {
    message: String,
}

fn build_messages<'a>(system: &'a str, messages: &'a [Message]) -> Vec<CcMessage<'a>> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if !system.trim().is_empty() {
        out.push(CcMessage { role: Role::System, content: system });
    }
    out.extend(messages.iter().map(|m| CcMessage { role: m.role, content: &m.content }));
    out
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_event(event: &SseEvent) -> Result<Chunk, LlmError> {
    let data = event.data.trim();
    if data.is_empty() {
        return Ok(Chunk::Skip);
    }
    if data == "[DONE]" {
        return Ok(Chunk::Done);
    }

    let chunk: CcChunk = serde_json::from_str(data).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    if let Some(error) = chunk.error {
        return Err(LlmError::StreamError(error.message));
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content);
    Ok(text.map_or(Chunk::Skip, Chunk::Text))
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
