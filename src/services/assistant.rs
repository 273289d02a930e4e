//! Assistant service — streamed LLM replies for the viewer help chat.
//!
//! DESIGN
//! ======
//! The client owns the conversation and sends it whole with every request.
//! The service prepends a fixed persona prompt, starts a streamed completion
//! and caps the whole exchange at a wall-clock ceiling: when the deadline
//! passes the stream yields one `TimedOut` error and ends, whether the
//! provider was still connecting or halfway through a reply.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message, TextStream};

pub const SYSTEM_PROMPT: &str = "You are a helpful chat assistant for a live streaming platform. \
Be friendly and engaging. Keep responses brief and relevant to the streaming context.";

pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(30);
/// Upper bound on any configured ceiling.
pub const MAX_DURATION_CAP: Duration = Duration::from_secs(3600);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("conversation is empty")]
    EmptyConversation,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("assistant reply exceeded {0:?}")]
    TimedOut(Duration),
}

impl crate::frame::ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::EmptyConversation => "E_EMPTY_CONVERSATION",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::TimedOut(_) => "E_TIMED_OUT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable()) || matches!(self, Self::TimedOut(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantLimits {
    pub max_tokens: u32,
    pub max_duration: Duration,
}

impl Default for AssistantLimits {
    fn default() -> Self {
        Self { max_tokens: DEFAULT_MAX_TOKENS, max_duration: DEFAULT_MAX_DURATION }
    }
}

/// Text deltas of one reply, ending early with an error on failure or timeout.
pub type ReplyStream = BoxStream<'static, Result<String, AssistantError>>;

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Start a streamed reply to `messages`.
///
/// # Errors
///
/// Fails before streaming when the conversation is empty, the provider
/// rejects the request, or the ceiling passes while connecting.
pub async fn reply(
    llm: &Arc<dyn LlmChat>,
    limits: AssistantLimits,
    messages: &[Message],
) -> Result<ReplyStream, AssistantError> {
    if messages.is_empty() {
        return Err(AssistantError::EmptyConversation);
    }
    let ceiling = limits.max_duration.min(MAX_DURATION_CAP);
    let deadline = Instant::now() + ceiling;
    info!(turns = messages.len(), max_tokens = limits.max_tokens, ?ceiling, "assistant: reply requested");

    let started = tokio::time::timeout_at(deadline, llm.stream_chat(limits.max_tokens, SYSTEM_PROMPT, messages)).await;
    let inner = match started {
        Ok(result) => result?,
        Err(_) => {
            warn!(?ceiling, "assistant: provider did not answer before the ceiling");
            return Err(AssistantError::TimedOut(ceiling));
        }
    };

    Ok(with_deadline(inner, deadline, ceiling))
}

fn with_deadline(inner: TextStream, deadline: Instant, ceiling: Duration) -> ReplyStream {
    let sleep = Box::pin(tokio::time::sleep_until(deadline));
    futures::stream::unfold(Some((inner, sleep)), move |state| async move {
        let (mut inner, mut sleep) = state?;
        tokio::select! {
            item = inner.next() => {
                let item = item?;
                Some((item.map_err(AssistantError::from), Some((inner, sleep))))
            }
            () = &mut sleep => {
                warn!(?ceiling, "assistant: reply cut off at the ceiling");
                Some((Err(AssistantError::TimedOut(ceiling)), None))
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
