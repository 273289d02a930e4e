//! Stream directory — browse, lookup, creation and share links.
//!
//! DESIGN
//! ======
//! The directory is in-memory only. It starts from six demo streams and
//! grows with streams created at runtime; nothing survives a restart.
//! Lookups never fail: an unknown id resolves to a placeholder record with
//! zero viewers so a stream view can always mount.

use serde::{Deserialize, Serialize};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Missing Information: please provide a title and select a category")]
    MissingInformation,
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("invalid public base url: {0}")]
    InvalidBaseUrl(String),
}

impl crate::frame::ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInformation => "E_MISSING_INFORMATION",
            Self::UnknownCategory(_) => "E_UNKNOWN_CATEGORY",
            Self::InvalidBaseUrl(_) => "E_INVALID_BASE_URL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRecord {
    pub id: String,
    pub title: String,
    pub streamer: String,
    pub category: String,
    pub viewers: u64,
    pub description: String,
    pub thumbnail: String,
    pub is_private: bool,
}

impl StreamRecord {
    /// Placeholder for ids the directory does not know.
    #[must_use]
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: "Unknown Stream".into(),
            streamer: "Unknown".into(),
            category: "Miscellaneous".into(),
            viewers: 0,
            description: "No description available.".into(),
            thumbnail: thumbnail_for("Unknown Stream"),
            is_private: false,
        }
    }
}

/// Input for creating a stream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStream {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category slug, e.g. `gaming` or `just-chatting`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub streamer: Option<String>,
}

/// Tile in the category grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub viewers: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { name: "Gaming", viewers: "250K" },
    Category { name: "Music", viewers: "120K" },
    Category { name: "Art", viewers: "85K" },
    Category { name: "Tech", viewers: "95K" },
    Category { name: "Fitness", viewers: "65K" },
    Category { name: "IRL", viewers: "180K" },
];

/// Category slugs accepted when creating a stream, with display names.
const CREATE_CATEGORIES: &[(&str, &str)] = &[
    ("gaming", "Gaming"),
    ("music", "Music"),
    ("cooking", "Cooking"),
    ("art", "Art"),
    ("technology", "Technology"),
    ("fitness", "Fitness"),
    ("just-chatting", "Just Chatting"),
];

const DEFAULT_STREAMER: &str = "CurrentUser";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub twitter: String,
    pub facebook: String,
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone)]
pub struct Catalog {
    streams: Vec<StreamRecord>,
    next_id: usize,
}

impl Catalog {
    #[must_use]
    pub fn demo() -> Self {
        let streams = vec![
            demo_stream(
                "stream1",
                "Gaming Marathon: New Releases",
                "GameMaster",
                "Gaming",
                1245,
                "Join me as we explore the latest game releases and discuss gaming news!",
            ),
            demo_stream(
                "stream2",
                "Cooking Italian Classics",
                "ChefAlex",
                "Cooking",
                876,
                "Learn how to make authentic Italian pasta and sauces from scratch.",
            ),
            demo_stream(
                "stream3",
                "Music Production Workshop",
                "BeatMaker",
                "Music",
                543,
                "Tips and tricks for producing professional-sounding music at home.",
            ),
            demo_stream(
                "stream4",
                "Art & Design: Digital Painting",
                "CreativeMinds",
                "Art",
                321,
                "Digital painting techniques for beginners and intermediate artists.",
            ),
            demo_stream(
                "stream5",
                "Tech Talk: AI Developments",
                "TechGuru",
                "Technology",
                987,
                "Discussing the latest developments in artificial intelligence and machine learning.",
            ),
            demo_stream(
                "stream6",
                "Fitness Session: HIIT Workout",
                "FitCoach",
                "Fitness",
                654,
                "High-intensity interval training for all fitness levels.",
            ),
        ];
        let next_id = streams.len() + 1;
        Self { streams, next_id }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StreamRecord> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// Record for `id`, or the unknown-stream placeholder.
    #[must_use]
    pub fn resolve(&self, id: &str) -> StreamRecord {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| StreamRecord::unknown(id))
    }

    /// Public streams, optionally filtered by category (case-insensitive).
    #[must_use]
    pub fn list(&self, category: Option<&str>) -> Vec<StreamRecord> {
        self.streams
            .iter()
            .filter(|s| !s.is_private)
            .filter(|s| category.is_none_or(|c| s.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect()
    }

    /// Register a new live stream.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingInformation`] when the title or the
    /// category is blank, and [`CatalogError::UnknownCategory`] for a slug
    /// outside the create form's list.
    pub fn create(&mut self, new: NewStream) -> Result<StreamRecord, CatalogError> {
        let title = new.title.trim();
        let slug = new.category.trim();
        if title.is_empty() || slug.is_empty() {
            return Err(CatalogError::MissingInformation);
        }
        let Some((_, category)) = CREATE_CATEGORIES
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(slug))
        else {
            return Err(CatalogError::UnknownCategory(slug.to_string()));
        };

        let id = self.allocate_id();
        let record = StreamRecord {
            id,
            title: title.to_string(),
            streamer: new
                .streamer
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STREAMER.to_string()),
            category: (*category).to_string(),
            viewers: 0,
            description: new.description.trim().to_string(),
            thumbnail: thumbnail_for(title),
            is_private: new.is_private,
        };
        self.streams.push(record.clone());
        Ok(record)
    }

    #[cfg(test)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let candidate = format!("stream{}", self.next_id);
            self.next_id += 1;
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

fn demo_stream(id: &str, title: &str, streamer: &str, category: &str, viewers: u64, description: &str) -> StreamRecord {
    StreamRecord {
        id: id.to_string(),
        title: title.to_string(),
        streamer: streamer.to_string(),
        category: category.to_string(),
        viewers,
        description: description.to_string(),
        thumbnail: thumbnail_for(title),
        is_private: false,
    }
}

fn thumbnail_for(title: &str) -> String {
    let label: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("+");
    format!("/placeholder.svg?height=200&width=350&text={label}")
}

// =============================================================================
// SHARING
// =============================================================================

/// Build the stream page URL and social share links for `record`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidBaseUrl`] when `base_url` is not an
/// absolute URL.
pub fn share_links(record: &StreamRecord, base_url: &str) -> Result<ShareLinks, CatalogError> {
    let mut page = reqwest::Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
        .map_err(|e| CatalogError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    page.path_segments_mut()
        .map_err(|()| CatalogError::InvalidBaseUrl(format!("{base_url}: not a hierarchical url")))?
        .pop_if_empty()
        .extend(["stream", record.id.as_str()]);

    let text = format!("Watching {}'s stream: {}", record.streamer, record.title);
    let twitter = reqwest::Url::parse_with_params(
        "https://twitter.com/intent/tweet",
        &[("text", text.as_str()), ("url", page.as_str())],
    )
    .map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;
    let facebook = reqwest::Url::parse_with_params("https://www.facebook.com/sharer/sharer.php", &[("u", page.as_str())])
        .map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;

    Ok(ShareLinks { url: page.to_string(), twitter: twitter.to_string(), facebook: facebook.to_string() })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
