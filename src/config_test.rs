use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.cadence, Cadence::default());
    assert_eq!(cfg.rng_seed, None);
    assert_eq!(cfg.public_base_url, "http://localhost:3000");
    assert_eq!(cfg.assistant, AssistantLimits::default());
}

#[test]
fn overrides_are_parsed() {
    let cfg = AppConfig::from_lookup(env(&[
        ("PORT", "8080"),
        ("CHAT_TICK_MS", "250"),
        ("VIEWER_TICK_MS", "1000"),
        ("CHAT_RNG_SEED", " 42 "),
        ("PUBLIC_BASE_URL", "https://live.example.test/"),
        ("ASSISTANT_MAX_DURATION_SECS", "10"),
        ("ASSISTANT_MAX_TOKENS", "128"),
    ]));
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.cadence.chat_tick, Duration::from_millis(250));
    assert_eq!(cfg.cadence.viewer_tick, Duration::from_secs(1));
    assert_eq!(cfg.rng_seed, Some(42));
    assert_eq!(cfg.public_base_url, "https://live.example.test");
    assert_eq!(cfg.assistant.max_duration, Duration::from_secs(10));
    assert_eq!(cfg.assistant.max_tokens, 128);
}

#[test]
fn garbage_falls_back_to_defaults() {
    let cfg = AppConfig::from_lookup(env(&[("PORT", "eighty"), ("CHAT_RNG_SEED", "abc"), ("PUBLIC_BASE_URL", "  ")]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.rng_seed, None);
    assert_eq!(cfg.public_base_url, DEFAULT_PUBLIC_BASE_URL);
}

#[test]
fn zero_tick_is_clamped() {
    let cfg = AppConfig::from_lookup(env(&[("CHAT_TICK_MS", "0")]));
    assert_eq!(cfg.cadence.chat_tick, Duration::from_millis(1));
}

#[test]
fn huge_assistant_ceiling_is_capped() {
    let cfg = AppConfig::from_lookup(env(&[("ASSISTANT_MAX_DURATION_SECS", &u64::MAX.to_string())]));
    assert_eq!(cfg.assistant.max_duration, MAX_DURATION_CAP);
}
