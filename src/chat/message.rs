//! Chat message model shared by the store, generator, composer and feed.

use serde::{Deserialize, Serialize};

/// Role flags shown next to an author's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badges {
    pub subscriber: bool,
    pub donor: bool,
    pub moderator: bool,
}

impl Badges {
    /// No flags set. Used for the local user.
    #[must_use]
    pub const fn none() -> Self {
        Self { subscriber: false, donor: false, moderator: false }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.subscriber || self.donor || self.moderator)
    }
}

/// One entry in a stream view's chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Opaque, unique within the session.
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub avatar_url: String,
    pub body: String,
    /// Milliseconds since Unix epoch.
    pub created_at: i64,
    pub badges: Badges,
}

/// Chat author identity (local user or a simulated viewer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Avatar image for a display name, seeded by the name itself.
#[must_use]
pub fn avatar_url(base: &str, name: &str) -> String {
    format!("{base}?seed={name}")
}
