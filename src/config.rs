//! Server configuration from environment variables.
//!
//! Every value has a default, so an empty environment yields a working demo
//! server on port 3000. Unparseable values fall back to the default.

use std::time::Duration;

use crate::chat::session::Cadence;
use crate::services::assistant::{AssistantLimits, MAX_DURATION_CAP};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CHAT_TICK_MS: u64 = 5000;
pub const DEFAULT_VIEWER_TICK_MS: u64 = 5000;
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_ASSISTANT_MAX_DURATION_SECS: u64 = 30;
pub const DEFAULT_ASSISTANT_MAX_TOKENS: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub cadence: Cadence,
    /// Fixed seed for simulated chat; `None` draws from the OS.
    pub rng_seed: Option<u64>,
    pub public_base_url: String,
    pub assistant: AssistantLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Read `PORT`, `CHAT_TICK_MS`, `VIEWER_TICK_MS`, `CHAT_RNG_SEED`,
    /// `PUBLIC_BASE_URL`, `ASSISTANT_MAX_DURATION_SECS` and
    /// `ASSISTANT_MAX_TOKENS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let chat_tick_ms = env_parse(&lookup, "CHAT_TICK_MS", DEFAULT_CHAT_TICK_MS).max(1);
        let viewer_tick_ms = env_parse(&lookup, "VIEWER_TICK_MS", DEFAULT_VIEWER_TICK_MS).max(1);
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());

        Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            cadence: Cadence {
                chat_tick: Duration::from_millis(chat_tick_ms),
                viewer_tick: Duration::from_millis(viewer_tick_ms),
            },
            rng_seed: lookup("CHAT_RNG_SEED").and_then(|v| v.trim().parse().ok()),
            public_base_url,
            assistant: AssistantLimits {
                max_tokens: env_parse(&lookup, "ASSISTANT_MAX_TOKENS", DEFAULT_ASSISTANT_MAX_TOKENS),
                max_duration: Duration::from_secs(env_parse(
                    &lookup,
                    "ASSISTANT_MAX_DURATION_SECS",
                    DEFAULT_ASSISTANT_MAX_DURATION_SECS,
                ))
                .min(MAX_DURATION_CAP),
            },
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
