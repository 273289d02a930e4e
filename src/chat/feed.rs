//! Presentation feed — the rendered, auto-following view of a chat log.
//!
//! DESIGN
//! ======
//! The feed remembers how much of the log it has already rendered. Each
//! `sync` renders only the newly appended tail and, when the log grew,
//! names the newest message as the scroll target. Auto-follow is
//! unconditional: the feed does not track whether the viewer has scrolled
//! back through history.

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use super::message::ChatMessage;

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub message: ChatMessage,
    /// Badge chips in display order.
    pub labels: Vec<&'static str>,
    /// Avatar fallback text.
    pub initials: String,
    /// `HH:MM` in UTC.
    pub time_label: String,
}

impl FeedEntry {
    #[must_use]
    pub fn render(message: &ChatMessage) -> Self {
        Self {
            labels: badge_labels(message),
            initials: initials(&message.author_name),
            time_label: time_label(message.created_at),
            message: message.clone(),
        }
    }
}

/// Result of a render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedUpdate {
    pub entries: Vec<FeedEntry>,
    /// Id of the entry the view should scroll to, if any.
    pub scroll_to: Option<String>,
}

#[derive(Debug, Default)]
pub struct Feed {
    rendered: usize,
}

impl Feed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the whole log from scratch.
    pub fn reset(&mut self, snapshot: &[ChatMessage]) -> FeedUpdate {
        self.rendered = 0;
        self.sync(snapshot)
    }

    /// Render entries appended since the previous pass.
    pub fn sync(&mut self, snapshot: &[ChatMessage]) -> FeedUpdate {
        let start = self.rendered.min(snapshot.len());
        let fresh = &snapshot[start..];
        self.rendered = snapshot.len();

        FeedUpdate {
            entries: fresh.iter().map(FeedEntry::render).collect(),
            scroll_to: fresh.last().map(|m| m.id.clone()),
        }
    }

    /// Render every entry without moving the sync position.
    #[must_use]
    pub fn render_all(snapshot: &[ChatMessage]) -> Vec<FeedEntry> {
        snapshot.iter().map(FeedEntry::render).collect()
    }

    #[cfg(test)]
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

fn badge_labels(message: &ChatMessage) -> Vec<&'static str> {
    let badges = message.badges;
    let mut labels = Vec::new();
    if badges.moderator {
        labels.push("MOD");
    }
    // MOD supersedes SUB.
    if badges.subscriber && !badges.moderator {
        labels.push("SUB");
    }
    if badges.donor {
        labels.push("DONOR");
    }
    labels
}

fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

fn time_label(created_at_ms: i64) -> String {
    let nanos = i128::from(created_at_ms) * 1_000_000;
    let Ok(at) = OffsetDateTime::from_unix_timestamp_nanos(nanos) else {
        return String::new();
    };
    at.format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
