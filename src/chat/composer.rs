//! Local composition and submission.
//!
//! The draft buffer belongs to the stream view. Emoji from the picker are
//! spliced into the draft without submitting it. Submission trims the
//! draft; a blank draft is silently ignored and left as is.

use uuid::Uuid;

use super::message::{Author, Badges, ChatMessage, avatar_url};

/// Emoji offered by the picker next to the chat input.
pub const EMOJI_PALETTE: &[&str] = &[
    "😀", "😂", "🤣", "😍", "🥰", "😎", "🤩", "😮", "😱", "👍", "👎", "👏", "🙌", "🔥", "💯", "❤️", "💔", "💪", "🎮",
    "🎯", "🏆", "🎸", "🎬", "🎨", "🎭", "🎤", "🎧", "🤔", "🧐", "🤯", "😴", "😭", "😡", "🤬", "🤮", "🤢", "🍕", "🍔",
    "🍟", "🍩", "🍦", "🍺", "🍷", "☕", "🍿",
];

#[derive(Debug, Clone)]
pub struct Composer {
    identity: Author,
    avatar_url: String,
    draft: String,
}

impl Composer {
    #[must_use]
    pub fn new(identity: Author, avatar_base: &str) -> Self {
        let avatar_url = avatar_url(avatar_base, &identity.name);
        Self { identity, avatar_url, draft: String::new() }
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Insert `emoji` at a character offset, or at the end without one.
    /// Offsets past the end are clamped to the end.
    pub fn insert_emoji(&mut self, emoji: &str, cursor: Option<usize>) {
        let byte_at = match cursor {
            Some(chars) => self
                .draft
                .char_indices()
                .nth(chars)
                .map_or(self.draft.len(), |(i, _)| i),
            None => self.draft.len(),
        };
        self.draft.insert_str(byte_at, emoji);
    }

    /// Turn the draft into a message from the local identity.
    ///
    /// Returns `None` (and keeps the draft) when it is blank.
    pub fn submit(&mut self, now_ms: i64) -> Option<ChatMessage> {
        let body = self.draft.trim();
        if body.is_empty() {
            return None;
        }

        let message = ChatMessage {
            id: format!("user-{}", Uuid::new_v4()),
            author_id: self.identity.id.clone(),
            author_name: self.identity.name.clone(),
            avatar_url: self.avatar_url.clone(),
            body: body.to_string(),
            created_at: now_ms,
            badges: Badges::none(),
        };
        self.draft.clear();
        Some(message)
    }
}

#[cfg(test)]
#[path = "composer_test.rs"]
mod tests;
