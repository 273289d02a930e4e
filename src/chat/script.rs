//! Chat script — the explicit configuration a stream view is built from.
//!
//! DESIGN
//! ======
//! Name pools, message templates, badge odds, the local identity and the
//! seed transcripts are plain data handed to each session at mount time.
//! Nothing here is global: two sessions built from different scripts are
//! fully isolated, which is what tests rely on.

use std::collections::HashMap;

use super::message::{Author, Badges, ChatMessage, avatar_url};

pub const DEFAULT_AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// Independent per-badge probabilities for synthetic messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeOdds {
    pub subscriber: f64,
    pub donor: f64,
    pub moderator: f64,
}

impl Default for BadgeOdds {
    fn default() -> Self {
        Self { subscriber: 0.3, donor: 0.1, moderator: 0.05 }
    }
}

/// One line of a seed transcript. Timestamps are relative to mount time.
#[derive(Debug, Clone)]
pub struct SeedLine {
    pub id: String,
    pub author: Author,
    pub body: String,
    /// Seconds before mount at which the line was "sent".
    pub age_secs: i64,
    pub badges: Badges,
}

impl SeedLine {
    #[must_use]
    pub fn new(id: &str, author_id: &str, author_name: &str, body: &str, age_secs: i64, badges: Badges) -> Self {
        Self {
            id: id.to_string(),
            author: Author::new(author_id, author_name),
            body: body.to_string(),
            age_secs,
            badges,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatScript {
    /// Identity attached to every locally submitted message.
    pub local_user: Author,
    /// Display names for simulated viewers.
    pub names: Vec<String>,
    /// Bodies for simulated messages.
    pub templates: Vec<String>,
    /// Chance that a generator tick emits a message.
    pub emit_probability: f64,
    pub badge_odds: BadgeOdds,
    pub avatar_base: String,
    /// Transcript used for any stream without its own entry.
    pub default_transcript: Vec<SeedLine>,
    /// Per-stream transcript overrides.
    pub transcripts: HashMap<String, Vec<SeedLine>>,
}

impl ChatScript {
    /// The stock demo script: ten viewer names, ten templates and a five
    /// line opening transcript shared by every stream.
    #[must_use]
    pub fn demo() -> Self {
        let sub = Badges { subscriber: true, ..Badges::none() };
        let default_transcript = vec![
            SeedLine::new("msg1", "user2", "StreamFan123", "Hey everyone! Excited for today's stream!", 300, sub),
            SeedLine::new("msg2", "user3", "GameLover", "What game are we playing today?", 240, Badges::none()),
            SeedLine::new(
                "msg3",
                "user4",
                "TechWizard",
                "The graphics look amazing on this game!",
                180,
                Badges { subscriber: true, donor: true, moderator: false },
            ),
            SeedLine::new("msg4", "user5", "CasualGamer", "First time catching your stream live!", 120, Badges::none()),
            SeedLine::new(
                "msg5",
                "user6",
                "StreamerFriend",
                "Good luck with the stream today!",
                60,
                Badges { subscriber: true, donor: false, moderator: true },
            ),
        ];

        Self {
            local_user: Author::new("user1", "CurrentUser"),
            names: to_strings(&[
                "GameEnthusiast",
                "StreamViewer",
                "DigitalNomad",
                "TechFan",
                "CasualWatcher",
                "ContentLover",
                "NewFollower",
                "RegularViewer",
                "GamingPro",
                "ChillVibes",
            ]),
            templates: to_strings(&[
                "This is so cool!",
                "Great stream today!",
                "Can you explain that again?",
                "LOL 😂",
                "Wow, nice move!",
                "I've been following for months, love your content!",
                "What settings are you using?",
                "Hello from Germany!",
                "First time here, this is awesome",
                "Do you stream every day?",
            ]),
            emit_probability: 0.5,
            badge_odds: BadgeOdds::default(),
            avatar_base: DEFAULT_AVATAR_BASE.to_string(),
            default_transcript,
            transcripts: HashMap::new(),
        }
    }

    /// Override the seed transcript of one stream.
    #[cfg(test)]
    #[must_use]
    pub fn with_transcript(mut self, stream_id: impl Into<String>, lines: Vec<SeedLine>) -> Self {
        self.transcripts.insert(stream_id.into(), lines);
        self
    }

    #[must_use]
    pub fn transcript_for(&self, stream_id: &str) -> &[SeedLine] {
        self.transcripts
            .get(stream_id)
            .map_or(self.default_transcript.as_slice(), Vec::as_slice)
    }

    /// Materialize the seed transcript of `stream_id` relative to `now_ms`.
    #[must_use]
    pub fn seed_messages(&self, stream_id: &str, now_ms: i64) -> Vec<ChatMessage> {
        self.transcript_for(stream_id)
            .iter()
            .map(|line| ChatMessage {
                id: line.id.clone(),
                author_id: line.author.id.clone(),
                author_name: line.author.name.clone(),
                avatar_url: avatar_url(&self.avatar_base, &line.author.name),
                body: line.body.clone(),
                created_at: now_ms - line.age_secs * 1000,
                badges: line.badges,
            })
            .collect()
    }
}

impl Default for ChatScript {
    fn default() -> Self {
        Self::demo()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
