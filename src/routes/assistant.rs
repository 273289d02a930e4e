//! Assistant chat route — server-sent events of streamed text deltas.
//!
//! Event names:
//! - `delta` — `{"text": "..."}` chunk of the reply
//! - `error` — `{"code": "...", "message": "..."}`; no more deltas follow
//! - `done` — `[DONE]`, always last

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, api_error};
use crate::frame::ErrorCode;
use crate::llm::types::Message;
use crate::services::assistant::{self, AssistantError};
use crate::state::AppState;

const KEEP_ALIVE_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `POST /api/chat` — stream an assistant reply to the posted conversation.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Some(llm) = &state.llm else {
        let err = AssistantError::LlmNotConfigured;
        return Err(api_error(assistant_error_to_status(&err), &err));
    };

    let reply = assistant::reply(llm, state.config.assistant, &body.messages)
        .await
        .map_err(|e| api_error(assistant_error_to_status(&e), &e))?;

    let events = reply
        .map(|item| {
            Ok(match item {
                Ok(text) => Event::default()
                    .event("delta")
                    .data(json!({ "text": text }).to_string()),
                Err(e) => error_event(&e),
            })
        })
        .chain(futures::stream::once(async { Ok(Event::default().event("done").data("[DONE]")) }));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS))))
}

fn error_event(err: &AssistantError) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "code": err.error_code(), "message": err.to_string() }).to_string())
}

pub(crate) fn assistant_error_to_status(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::EmptyConversation => StatusCode::BAD_REQUEST,
        AssistantError::Llm(_) => StatusCode::BAD_GATEWAY,
        AssistantError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
