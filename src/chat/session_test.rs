use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::time::{sleep, timeout};

use super::*;
use crate::chat::message::Badges;
use crate::chat::script::SeedLine;

const TICK: Duration = Duration::from_secs(5);
const NEVER: Duration = Duration::from_secs(3600);

/// Deterministic source: every chance returns `emit`, every index 0.
/// Counts calls so tests can prove that no tick ran.
struct Fixed {
    emit: bool,
    calls: Arc<AtomicUsize>,
}

impl RandomSource for Fixed {
    fn chance(&mut self, _p: f64) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.emit
    }

    fn index(&mut self, _len: usize) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst);
        0
    }
}

fn fixed_factory(emit: bool, calls: &Arc<AtomicUsize>) -> RngFactory {
    let calls = Arc::clone(calls);
    Arc::new(move || -> Box<dyn RandomSource> { Box::new(Fixed { emit, calls: Arc::clone(&calls) }) })
}

fn two_stream_script() -> ChatScript {
    ChatScript::demo()
        .with_transcript(
            "stream1",
            vec![
                SeedLine::new("s1-a", "u1", "Alpha", "one", 20, Badges::none()),
                SeedLine::new("s1-b", "u2", "Beta", "two", 10, Badges::none()),
            ],
        )
        .with_transcript("stream2", vec![SeedLine::new("s2-a", "u3", "Gamma", "pasta", 5, Badges::none())])
}

fn view(emit: bool, cadence: Cadence, calls: &Arc<AtomicUsize>) -> StreamView {
    StreamView::new(SessionContext {
        script: Arc::new(two_stream_script()),
        cadence,
        rng: fixed_factory(emit, calls),
    })
}

fn chat_only() -> Cadence {
    Cadence { chat_tick: TICK, viewer_tick: NEVER }
}

fn info(stream_id: &str, viewers: u64) -> MountInfo {
    MountInfo { stream_id: stream_id.into(), streamer: "GameMaster".into(), viewers }
}

fn ids(entries: &[FeedEntry]) -> Vec<String> {
    entries.iter().map(|e| e.message.id.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn mount_seeds_transcript_and_follows_newest() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    assert_eq!(view.stream_id(), None);

    let mounted = view.mount(info("stream1", 1245)).await;

    assert_eq!(view.stream_id(), Some("stream1"));
    assert_eq!(ids(&mounted.feed.entries), ["s1-a", "s1-b"]);
    assert_eq!(mounted.feed.scroll_to.as_deref(), Some("s1-b"));
    assert_eq!(mounted.viewers, 1245);
}

#[tokio::test(start_paused = true)]
async fn generator_appends_after_one_tick() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(true, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    let event = timeout(TICK * 2, view.next_event())
        .await
        .expect("tick should fire");
    let update = match event {
        SessionEvent::Appended(update) => update,
        other => panic!("expected appended event, got {other:?}"),
    };
    assert_eq!(update.entries.len(), 1);
    let entry = &update.entries[0];
    assert!(entry.message.id.starts_with("auto-"));
    assert_eq!(entry.message.author_name, "GameEnthusiast");
    assert_eq!(update.scroll_to.as_deref(), Some(entry.message.id.as_str()));

    let history = view.history().await.expect("history");
    assert_eq!(history.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn quiet_generator_leaves_log_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    assert!(timeout(TICK * 4 + Duration::from_millis(10), view.next_event()).await.is_err());
    assert_eq!(view.history().await.expect("history").len(), 2);
    assert!(calls.load(Ordering::SeqCst) >= 4, "each tick consults the random source");
}

#[tokio::test(start_paused = true)]
async fn submit_hello_appends_local_message() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    view.set_draft("hello".into()).await.expect("draft");
    let submission = view.submit(None).await.expect("submit");
    assert!(submission.accepted);
    assert_eq!(submission.draft, "");

    let SessionEvent::Appended(update) = view.next_event().await else {
        panic!("expected appended event");
    };
    assert_eq!(update.entries.len(), 1);
    let msg = &update.entries[0].message;
    assert_eq!(msg.body, "hello");
    assert_eq!(msg.author_id, "user1");
    assert!(msg.badges.is_empty());

    assert_eq!(view.history().await.expect("history").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn blank_submit_is_silent_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    view.set_draft("   ".into()).await.expect("draft");
    let submission = view.submit(None).await.expect("submit");
    assert!(!submission.accepted);
    assert_eq!(submission.draft, "   ");
    assert_eq!(view.history().await.expect("history").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn blank_replacement_text_keeps_draft() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    view.set_draft("hello".into()).await.expect("draft");
    let submission = view.submit(Some(" \t ".into())).await.expect("submit");
    assert!(!submission.accepted);
    assert_eq!(submission.draft, "hello");
    assert_eq!(view.history().await.expect("history").len(), 2);

    let submission = view.submit(Some("gg".into())).await.expect("submit");
    assert!(submission.accepted);
    assert_eq!(submission.draft, "");
    let history = view.history().await.expect("history");
    assert_eq!(history.last().map(|e| e.message.body.as_str()), Some("gg"));
}

#[tokio::test(start_paused = true)]
async fn emoji_extends_draft_without_submitting() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    view.set_draft("gg".into()).await.expect("draft");
    let draft = view.insert_emoji("🔥".into(), None).await.expect("emoji");
    assert_eq!(draft, "gg🔥");
    let draft = view.insert_emoji("👏".into(), Some(0)).await.expect("emoji");
    assert_eq!(draft, "👏gg🔥");
    assert_eq!(view.history().await.expect("history").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn switching_stream_reseeds_with_new_transcript() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(true, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;
    view.set_draft("left behind".into()).await.expect("draft");
    view.submit(None).await.expect("submit");

    let mounted = view.mount(info("stream2", 20)).await;

    assert_eq!(view.stream_id(), Some("stream2"));
    assert_eq!(ids(&mounted.feed.entries), ["s2-a"]);
    assert_eq!(ids(&view.history().await.expect("history")), ["s2-a"]);
    // The stream1 append event was discarded with its session.
    let next = timeout(Duration::from_millis(10), view.next_event()).await;
    assert!(next.is_err(), "no stale event expected, got {next:?}");
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_timers_and_returns_log() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(true, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    let store = view.unmount().await.expect("active view returns its log");
    let len_at_teardown = store.len();
    let calls_at_teardown = calls.load(Ordering::SeqCst);

    sleep(TICK * 3).await;

    assert_eq!(store.len(), len_at_teardown);
    assert_eq!(calls.load(Ordering::SeqCst), calls_at_teardown, "no tick may run after unmount");
    assert_eq!(view.stream_id(), None);
    assert!(matches!(view.history().await, Err(SessionError::NotMounted)));
    assert!(view.unmount().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_active_view_cancels_session() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(true, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;
    drop(view);

    // Let the cancelled task observe the token.
    tokio::task::yield_now().await;
    let calls_after_drop = calls.load(Ordering::SeqCst);
    sleep(TICK * 3).await;
    assert_eq!(calls.load(Ordering::SeqCst), calls_after_drop);
}

#[tokio::test(start_paused = true)]
async fn viewer_count_jitters_and_floors_at_zero() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cadence = Cadence { chat_tick: NEVER, viewer_tick: TICK };
    let mut view = view(false, cadence, &calls);
    view.mount(info("stream1", 7)).await;

    // index 0 maps to a -5 step.
    assert_eq!(view.next_event().await, SessionEvent::Viewers(2));
    assert_eq!(view.next_event().await, SessionEvent::Viewers(0));
    assert_eq!(view.next_event().await, SessionEvent::Viewers(0));
}

#[tokio::test(start_paused = true)]
async fn like_and_follow_toggle_with_notices() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut view = view(false, chat_only(), &calls);
    view.mount(info("stream1", 10)).await;

    let liked = view.toggle_like().await.expect("like");
    assert!(liked.active);
    assert_eq!(liked.notice.map(|n| n.title), Some("Stream Liked!".to_string()));
    let unliked = view.toggle_like().await.expect("unlike");
    assert!(!unliked.active);
    assert!(unliked.notice.is_none());

    let follow = view.toggle_follow().await.expect("follow");
    assert!(follow.active);
    assert_eq!(
        follow.notice.map(|n| n.description),
        Some("You're now following GameMaster!".to_string())
    );
    let unfollow = view.toggle_follow().await.expect("unfollow");
    assert_eq!(unfollow.notice.map(|n| n.title), Some("Unfollowed".to_string()));
}

#[tokio::test(start_paused = true)]
async fn commands_before_mount_fail() {
    let calls = Arc::new(AtomicUsize::new(0));
    let view = view(false, chat_only(), &calls);
    assert!(matches!(view.submit(None).await, Err(SessionError::NotMounted)));
    assert!(matches!(view.toggle_like().await, Err(SessionError::NotMounted)));
}

#[test]
fn seeded_factory_replays_same_choices() {
    let factory = rng_factory(Some(42));
    let mut a = factory();
    let mut b = factory();
    let left: Vec<usize> = (0..16).map(|_| a.index(100)).collect();
    let right: Vec<usize> = (0..16).map(|_| b.index(100)).collect();
    assert_eq!(left, right);
}
