use super::*;
use crate::chat::message::Badges;

fn msg(id: &str, created_at: i64) -> ChatMessage {
    ChatMessage {
        id: id.into(),
        author_id: "user9".into(),
        author_name: "Tester".into(),
        avatar_url: String::new(),
        body: format!("body {id}"),
        created_at,
        badges: Badges::none(),
    }
}

#[test]
fn new_store_is_empty() {
    let store = MessageStore::new("stream1");
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.last().is_none());
    assert_eq!(store.stream_id(), "stream1");
}

#[test]
fn append_preserves_call_order() {
    let mut store = MessageStore::new("stream1");
    let ids = ["c", "a", "e", "b", "d"];
    for (i, id) in ids.iter().enumerate() {
        store.append(msg(id, i64::try_from(i).unwrap()));
    }

    let order: Vec<&str> = store.snapshot().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(order, ids);
}

#[test]
fn append_keeps_duplicates() {
    let mut store = MessageStore::new("stream1");
    store.append(msg("same", 1));
    store.append(msg("same", 1));
    assert_eq!(store.len(), 2);
}

#[test]
fn append_clamps_backwards_timestamp() {
    let mut store = MessageStore::new("stream1");
    store.append(msg("a", 500));
    let stored = store.append(msg("b", 100));
    assert_eq!(stored.created_at, 500);

    let stamps: Vec<i64> = store.snapshot().iter().map(|m| m.created_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn append_allows_equal_timestamps() {
    let mut store = MessageStore::new("stream1");
    store.append(msg("a", 42));
    let stored = store.append(msg("b", 42));
    assert_eq!(stored.created_at, 42);
}

#[test]
fn seeded_store_holds_transcript_in_order() {
    let store = MessageStore::seeded("stream2", vec![msg("s1", 10), msg("s2", 20)]);
    assert_eq!(store.len(), 2);
    assert_eq!(store.snapshot()[0].id, "s1");
    assert_eq!(store.last().map(|m| m.id.as_str()), Some("s2"));
}

#[test]
fn log_never_shrinks() {
    let mut store = MessageStore::new("stream1");
    let mut previous = store.len();
    for i in 0..20 {
        store.append(msg(&format!("m{i}"), i));
        assert!(store.len() > previous);
        previous = store.len();
    }
}
