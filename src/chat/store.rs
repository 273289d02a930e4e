//! Message store — the ordered chat log of one stream view.
//!
//! DESIGN
//! ======
//! Append-only. Insertion order is display order and chronological order:
//! a message stamped earlier than its predecessor is clamped up to the
//! predecessor's timestamp on append. Nothing is ever removed, reordered
//! or deduplicated. A new store is built whenever the view mounts.

use super::message::ChatMessage;

#[derive(Debug, Clone)]
pub struct MessageStore {
    stream_id: String,
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    #[must_use]
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self { stream_id: stream_id.into(), messages: Vec::new() }
    }

    /// Build a store pre-populated with a seed transcript, in order.
    #[must_use]
    pub fn seeded(stream_id: impl Into<String>, seed: impl IntoIterator<Item = ChatMessage>) -> Self {
        let mut store = Self::new(stream_id);
        for message in seed {
            store.append(message);
        }
        store
    }

    /// Add one message to the end of the log and return the stored copy.
    pub fn append(&mut self, mut message: ChatMessage) -> &ChatMessage {
        if let Some(last) = self.messages.last() {
            message.created_at = message.created_at.max(last.created_at);
        }
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Current ordered sequence.
    #[must_use]
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
