use std::sync::Arc;

use axum::response::IntoResponse;

use super::*;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, TextStream};
use crate::state::test_helpers;

struct EchoLlm;

#[async_trait::async_trait]
impl LlmChat for EchoLlm {
    async fn stream_chat(&self, _max_tokens: u32, _system: &str, messages: &[Message]) -> Result<TextStream, LlmError> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let deltas = vec![Ok("You said: ".to_string()), Ok(last)];
        Ok(futures::stream::iter(deltas).boxed())
    }
}

struct FailingLlm;

#[async_trait::async_trait]
impl LlmChat for FailingLlm {
    async fn stream_chat(&self, _max_tokens: u32, _system: &str, _messages: &[Message]) -> Result<TextStream, LlmError> {
        let items = vec![Ok("par".to_string()), Err(LlmError::StreamError("overloaded".into()))];
        Ok(futures::stream::iter(items).boxed())
    }
}

fn body(messages: Vec<Message>) -> Json<ChatBody> {
    Json(ChatBody { messages })
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn without_llm_is_service_unavailable() {
    let state = test_helpers::test_app_state();
    let (status, Json(err)) = chat(State(state), body(vec![Message::user("hi")]))
        .await
        .err()
        .unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err["code"], "E_LLM_NOT_CONFIGURED");
}

#[tokio::test]
async fn empty_history_is_bad_request() {
    let state = test_helpers::test_app_state_with_llm(Arc::new(EchoLlm));
    let (status, _) = chat(State(state), body(Vec::new())).await.err().unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn streams_deltas_then_done() {
    let state = test_helpers::test_app_state_with_llm(Arc::new(EchoLlm));
    let sse = chat(State(state), body(vec![Message::user("hello")]))
        .await
        .unwrap_or_else(|_| panic!("chat should stream"));
    let response = sse.into_response();
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let text = body_text(response).await;
    assert!(text.contains("event: delta\ndata: {\"text\":\"You said: \"}"));
    assert!(text.contains("data: {\"text\":\"hello\"}"));
    assert!(text.trim_end().ends_with("event: done\ndata: [DONE]"));
}

#[tokio::test]
async fn mid_stream_failure_becomes_error_event() {
    let state = test_helpers::test_app_state_with_llm(Arc::new(FailingLlm));
    let sse = chat(State(state), body(vec![Message::user("hello")]))
        .await
        .unwrap_or_else(|_| panic!("chat should stream"));
    let text = body_text(sse.into_response()).await;
    assert!(text.contains("event: error\ndata: {\"code\":\"E_LLM_ERROR\""));
    assert!(text.trim_end().ends_with("data: [DONE]"));
}

#[test]
fn assistant_errors_map_to_statuses() {
    assert_eq!(
        assistant_error_to_status(&AssistantError::TimedOut(Duration::from_secs(30))),
        StatusCode::GATEWAY_TIMEOUT
    );
    assert_eq!(
        assistant_error_to_status(&AssistantError::Llm(LlmError::ApiRequest("x".into()))),
        StatusCode::BAD_GATEWAY
    );
}
