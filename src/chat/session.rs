//! Stream view session — lifecycle, timers and the single event loop.
//!
//! ARCHITECTURE
//! ============
//! A `StreamView` is `Idle` until `mount`, then `Active` with exactly one
//! tokio task that owns the chat log, the draft, the feed cursor and the
//! random source. The task runs one `select!` loop over:
//! - the cancellation token
//! - commands from the owner (draft edits, submissions, toggles)
//! - the synthetic chat ticker
//! - the viewer-count ticker
//!
//! Every mutation is one branch of that loop, so appends from the local
//! user and from the generator are serialized in arrival order without
//! locks.
//!
//! LIFECYCLE
//! =========
//! 1. `mount` → seed the log, spawn the task, return the initial feed
//! 2. commands / ticks → task mutates and emits `SessionEvent`s
//! 3. `unmount` → cancel, await the task, hand back the discarded log
//!
//! The token is wrapped in a `DropGuard`, so dropping an active view on any
//! other path (connection error, panic, owner going away) also stops the
//! timers. Each mount has its own event channel; events of a discarded
//! session are never observed by the next one.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::composer::Composer;
use super::feed::{Feed, FeedEntry, FeedUpdate};
use super::generator::{self, RandomSource, RngSource};
use super::script::ChatScript;
use super::store::MessageStore;
use crate::frame::now_ms;

const COMMAND_QUEUE_CAPACITY: usize = 32;
const EVENT_QUEUE_CAPACITY: usize = 256;

// =============================================================================
// CONTEXT
// =============================================================================

/// Builds a fresh random source for each mounted session.
pub type RngFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

/// Build a factory from an optional fixed seed. A seed makes every
/// session replay the same simulated activity.
#[must_use]
pub fn rng_factory(seed: Option<u64>) -> RngFactory {
    match seed {
        Some(seed) => Arc::new(move || -> Box<dyn RandomSource> { Box::new(RngSource(StdRng::seed_from_u64(seed))) }),
        None => Arc::new(|| -> Box<dyn RandomSource> { Box::new(RngSource(StdRng::from_os_rng())) }),
    }
}

/// Timer periods of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub chat_tick: Duration,
    pub viewer_tick: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self { chat_tick: Duration::from_secs(5), viewer_tick: Duration::from_secs(5) }
    }
}

/// Everything a session needs besides the stream it shows.
#[derive(Clone)]
pub struct SessionContext {
    pub script: Arc<ChatScript>,
    pub cadence: Cadence,
    pub rng: RngFactory,
}

/// Stream-specific inputs resolved by the caller before mounting.
#[derive(Debug, Clone)]
pub struct MountInfo {
    pub stream_id: String,
    pub streamer: String,
    pub viewers: u64,
}

// =============================================================================
// OUTPUT TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no stream is mounted; join a stream first")]
    NotMounted,
    #[error("stream session has stopped")]
    Closed,
}

impl crate::frame::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotMounted => "E_NOT_JOINED",
            Self::Closed => "E_SESSION_CLOSED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Unsolicited output of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The log grew; carries the freshly rendered tail.
    Appended(FeedUpdate),
    /// The simulated viewer count changed.
    Viewers(u64),
}

/// State handed back by `mount`.
#[derive(Debug, Clone)]
pub struct Mounted {
    pub feed: FeedUpdate,
    pub viewers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

/// Result of flipping a like/follow flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub active: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub accepted: bool,
    pub draft: String,
}


enum Command {
    SetDraft { text: String, reply: oneshot::Sender<String> },
    InsertEmoji { emoji: String, cursor: Option<usize>, reply: oneshot::Sender<String> },
    Submit { text: Option<String>, reply: oneshot::Sender<Submission> },
    History { reply: oneshot::Sender<Vec<FeedEntry>> },
    ToggleLike { reply: oneshot::Sender<Toggle> },
    ToggleFollow { reply: oneshot::Sender<Toggle> },
}

// =============================================================================
// STREAM VIEW
// =============================================================================

struct ActiveView {
    stream_id: String,
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<SessionEvent>,
    cancel: CancellationToken,
    task: JoinHandle<MessageStore>,
    _guard: DropGuard,
}

/// One viewer's stream page: at most one active chat session at a time.
pub struct StreamView {
    ctx: SessionContext,
    active: Option<ActiveView>,
}

impl StreamView {
    #[must_use]
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx, active: None }
    }

    #[must_use]
    pub fn stream_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.stream_id.as_str())
    }

    /// Start a session for `info.stream_id`, tearing down any current one.
    pub async fn mount(&mut self, info: MountInfo) -> Mounted {
        if self.active.is_some() {
            self.unmount().await;
        }

        let now = now_ms();
        let seed = self.ctx.script.seed_messages(&info.stream_id, now);
        let store = MessageStore::seeded(info.stream_id.clone(), seed);
        let mut feed = Feed::new();
        let initial = feed.reset(store.snapshot());

        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let cancel = CancellationToken::new();

        let sim = Simulation {
            composer: Composer::new(self.ctx.script.local_user.clone(), &self.ctx.script.avatar_base),
            script: Arc::clone(&self.ctx.script),
            store,
            feed,
            rng: (self.ctx.rng)(),
            viewers: info.viewers,
            liked: false,
            following: false,
            streamer: info.streamer,
        };
        let task = tokio::spawn(run_session(sim, self.ctx.cadence, cmd_rx, event_tx, cancel.clone()));

        info!(stream_id = %info.stream_id, viewers = info.viewers, "stream view mounted");
        self.active = Some(ActiveView {
            stream_id: info.stream_id,
            commands: cmd_tx,
            events: event_rx,
            _guard: cancel.clone().drop_guard(),
            cancel,
            task,
        });

        Mounted { feed: initial, viewers: info.viewers }
    }

    /// Stop the session and return its discarded log. `None` when idle.
    pub async fn unmount(&mut self) -> Option<MessageStore> {
        let active = self.active.take()?;
        active.cancel.cancel();
        let stream_id = active.stream_id;
        drop(active.events);

        match active.task.await {
            Ok(store) => {
                info!(%stream_id, messages = store.len(), "stream view unmounted");
                Some(store)
            }
            Err(e) => {
                warn!(%stream_id, error = %e, "stream session task failed");
                None
            }
        }
    }

    /// Wait for the next session event. Pends forever while idle.
    pub async fn next_event(&mut self) -> SessionEvent {
        loop {
            let Some(active) = self.active.as_mut() else {
                return std::future::pending().await;
            };
            match active.events.recv().await {
                Some(event) => return event,
                None => {
                    warn!(stream_id = %active.stream_id, "stream session ended unexpectedly");
                    self.active = None;
                }
            }
        }
    }

    pub async fn set_draft(&self, text: String) -> Result<String, SessionError> {
        self.request(|reply| Command::SetDraft { text, reply }).await
    }

    pub async fn insert_emoji(&self, emoji: String, cursor: Option<usize>) -> Result<String, SessionError> {
        self.request(|reply| Command::InsertEmoji { emoji, cursor, reply }).await
    }

    /// Submit the draft, or `text` in its place. Blank `text` is rejected
    /// without touching the draft.
    pub async fn submit(&self, text: Option<String>) -> Result<Submission, SessionError> {
        self.request(|reply| Command::Submit { text, reply }).await
    }

    pub async fn history(&self) -> Result<Vec<FeedEntry>, SessionError> {
        self.request(|reply| Command::History { reply }).await
    }

    pub async fn toggle_like(&self) -> Result<Toggle, SessionError> {
        self.request(|reply| Command::ToggleLike { reply }).await
    }

    pub async fn toggle_follow(&self) -> Result<Toggle, SessionError> {
        self.request(|reply| Command::ToggleFollow { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NotMounted)?;
        let (tx, rx) = oneshot::channel();
        active
            .commands
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

// =============================================================================
// SESSION TASK
// =============================================================================

/// State owned by the session task.
struct Simulation {
    script: Arc<ChatScript>,
    store: MessageStore,
    composer: Composer,
    feed: Feed,
    rng: Box<dyn RandomSource>,
    viewers: u64,
    liked: bool,
    following: bool,
    streamer: String,
}

impl Simulation {
    /// Apply one command. Returns a feed update when the log grew.
    fn handle(&mut self, command: Command) -> Option<FeedUpdate> {
        match command {
            Command::SetDraft { text, reply } => {
                self.composer.set_draft(text);
                let _ = reply.send(self.composer.draft().to_string());
                None
            }
            Command::InsertEmoji { emoji, cursor, reply } => {
                self.composer.insert_emoji(&emoji, cursor);
                let _ = reply.send(self.composer.draft().to_string());
                None
            }
            Command::Submit { text, reply } => {
                let update = match text {
                    Some(text) if text.trim().is_empty() => None,
                    Some(text) => {
                        self.composer.set_draft(text);
                        self.submit_draft()
                    }
                    None => self.submit_draft(),
                };
                let _ = reply.send(Submission { accepted: update.is_some(), draft: self.composer.draft().to_string() });
                update
            }
            Command::History { reply } => {
                let _ = reply.send(Feed::render_all(self.store.snapshot()));
                None
            }
            Command::ToggleLike { reply } => {
                self.liked = !self.liked;
                let notice = self.liked.then(|| Notice {
                    title: "Stream Liked!".into(),
                    description: "You've liked this stream".into(),
                });
                let _ = reply.send(Toggle { active: self.liked, notice });
                None
            }
            Command::ToggleFollow { reply } => {
                self.following = !self.following;
                let notice = if self.following {
                    Notice { title: "Following!".into(), description: format!("You're now following {}!", self.streamer) }
                } else {
                    Notice { title: "Unfollowed".into(), description: format!("You've unfollowed {}", self.streamer) }
                };
                let _ = reply.send(Toggle { active: self.following, notice: Some(notice) });
                None
            }
        }
    }

    fn submit_draft(&mut self) -> Option<FeedUpdate> {
        let message = self.composer.submit(now_ms())?;
        self.store.append(message);
        Some(self.feed.sync(self.store.snapshot()))
    }

    fn generate(&mut self) -> Option<FeedUpdate> {
        let message = generator::tick(&self.script, self.rng.as_mut(), now_ms())?;
        self.store.append(message);
        Some(self.feed.sync(self.store.snapshot()))
    }

    fn jitter(&mut self) -> u64 {
        self.viewers = generator::jitter_viewers(self.viewers, self.rng.as_mut());
        self.viewers
    }
}

/// Outcome of handing an event to the owner.
enum Delivery {
    Sent,
    OwnerGone,
}

/// Never blocks the loop: a full queue drops the event with a warning.
fn deliver(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) -> Delivery {
    match events.try_send(event) {
        Ok(()) => Delivery::Sent,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("session event queue full; dropping event");
            Delivery::Sent
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::OwnerGone,
    }
}

async fn run_session(
    mut sim: Simulation,
    cadence: Cadence,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
) -> MessageStore {
    let start = Instant::now();
    let mut chat_ticker = interval_at(start + cadence.chat_tick, cadence.chat_tick);
    chat_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut viewer_ticker = interval_at(start + cadence.viewer_tick, cadence.viewer_tick);
    viewer_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            command = commands.recv() => {
                let Some(command) = command else { break };
                sim.handle(command).map(SessionEvent::Appended)
            }
            _ = chat_ticker.tick() => sim.generate().map(SessionEvent::Appended),
            _ = viewer_ticker.tick() => Some(SessionEvent::Viewers(sim.jitter())),
        };

        if let Some(event) = event {
            if let Delivery::OwnerGone = deliver(&events, event) {
                break;
            }
        }
    }

    debug!(stream_id = %sim.store.stream_id(), "stream session loop exited");
    sim.store
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
