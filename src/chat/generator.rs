//! Synthetic activity generator — fabricated messages from simulated viewers.
//!
//! DESIGN
//! ======
//! The generator is a pure function of (script, random source, clock): one
//! call is one tick. Scheduling and cancellation live in the session task,
//! so the generator itself can never outlive the view that owns it.
//! All random decisions go through [`RandomSource`] so tests can script them.

use uuid::Uuid;

use super::message::{Badges, ChatMessage, avatar_url};
use super::script::ChatScript;

// =============================================================================
// RANDOM SOURCE
// =============================================================================

/// The random decisions the simulator needs.
pub trait RandomSource: Send {
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

/// Adapter from any `rand` generator to [`RandomSource`].
pub struct RngSource<R>(pub R);

impl<R: rand::Rng + Send> RandomSource for RngSource<R> {
    fn chance(&mut self, p: f64) -> bool {
        self.0.random_bool(p.clamp(0.0, 1.0))
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Decide whether this tick emits, and if so build the message.
///
/// Returns `None` on a quiet tick or when the script has an empty pool.
pub fn tick(script: &ChatScript, rng: &mut dyn RandomSource, now_ms: i64) -> Option<ChatMessage> {
    if script.names.is_empty() || script.templates.is_empty() {
        return None;
    }
    if !rng.chance(script.emit_probability) {
        return None;
    }

    let name_index = rng.index(script.names.len());
    let body_index = rng.index(script.templates.len());
    let name = &script.names[name_index];

    let odds = script.badge_odds;
    let badges = Badges {
        subscriber: rng.chance(odds.subscriber),
        donor: rng.chance(odds.donor),
        moderator: rng.chance(odds.moderator),
    };

    Some(ChatMessage {
        id: format!("auto-{}", Uuid::new_v4()),
        author_id: format!("auto-user-{name_index}"),
        author_name: name.clone(),
        avatar_url: avatar_url(&script.avatar_base, name),
        body: script.templates[body_index].clone(),
        created_at: now_ms,
        badges,
    })
}

/// Next viewer count: drift by a uniform step in `-5..=5`, floored at zero.
pub fn jitter_viewers(current: u64, rng: &mut dyn RandomSource) -> u64 {
    let step = rng.index(11);
    if step >= 5 {
        current.saturating_add((step - 5) as u64)
    } else {
        current.saturating_sub((5 - step) as u64)
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
