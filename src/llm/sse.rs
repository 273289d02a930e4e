//! Provider SSE streams to text deltas.
//!
//! Event framing is left to `eventsource-stream`; each provider supplies a
//! parser that turns one decoded event into a [`Chunk`].

use std::fmt::Display;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};

use super::types::{LlmError, TextStream};

pub use eventsource_stream::Event as SseEvent;

/// What a provider parser made of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Text(String),
    Skip,
    Done,
}

/// Turn a provider's raw SSE byte stream into text deltas.
///
/// The stream ends at the first [`Chunk::Done`], the first error, or when the
/// body runs out, whichever comes first.
pub fn text_stream<S, B, E, F>(bytes: S, parse: F) -> TextStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    F: FnMut(&SseEvent) -> Result<Chunk, LlmError> + Send + 'static,
{
    let events = bytes.eventsource().boxed();
    futures::stream::unfold(Some((events, parse)), |state| async move {
        let (mut events, mut parse) = state?;
        loop {
            let chunk = match events.next().await? {
                Ok(event) => parse(&event),
                Err(e) => Err(LlmError::ApiRequest(e.to_string())),
            };
            match chunk {
                Ok(Chunk::Text(text)) if !text.is_empty() => return Some((Ok(text), Some((events, parse)))),
                Ok(Chunk::Text(_) | Chunk::Skip) => {}
                Ok(Chunk::Done) => return None,
                Err(e) => return Some((Err(e), None)),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;
