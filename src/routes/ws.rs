//! WebSocket handler — one stream view per connection.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, builds an idle `StreamView` and enters
//! a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Session events (synthetic chat, viewer jitter) → push to client
//!
//! Handler functions validate, drive the view and return an `Outcome`. The
//! dispatch layer turns that into the reply frame.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. `stream:join` → mount (or switch) the view, reply with the seeded feed
//! 3. Client frames → dispatch → reply; session events → pushed frames
//! 4. Close → unmount, which stops the session timers

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::feed::FeedUpdate;
use crate::chat::session::{MountInfo, SessionError, SessionEvent, StreamView, Toggle};
use crate::frame::{Data, Frame, Status};
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. Handlers never send frames directly.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send empty done to sender.
    Done,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut view = StreamView::new(state.session.clone());

    let welcome = Frame::request("session:connected", Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");

    'conn: loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for frame in process_inbound_text(&state, &mut view, client_id, &text).await {
                            if send_frame(&mut socket, &frame).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = view.next_event() => {
                let Some(stream_id) = view.stream_id() else { continue };
                let frame = event_frame(stream_id, event);
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    view.unmount().await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
async fn process_inbound_text(state: &AppState, view: &mut StreamView, client_id: Uuid, text: &str) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "stream" => handle_stream(state, view, &req).await,
        "chat" => handle_chat(view, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    let reply = match result {
        Ok(Outcome::Reply(data)) => req.done_with(data),
        Ok(Outcome::Done) => req.done(),
        Err(err_frame) => err_frame,
    };
    match view.stream_id() {
        Some(stream_id) if reply.stream_id.is_none() => vec![reply.with_stream_id(stream_id)],
        _ => vec![reply],
    }
}

// =============================================================================
// STREAM HANDLERS
// =============================================================================

async fn handle_stream(state: &AppState, view: &mut StreamView, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "join" => {
            let Some(stream_id) = req
                .stream_id
                .as_deref()
                .or_else(|| req.data_str("stream_id"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
            else {
                return Err(req.error("stream_id required"));
            };

            let record = state.catalog.read().await.resolve(&stream_id);
            let mounted = view
                .mount(MountInfo { stream_id, streamer: record.streamer.clone(), viewers: record.viewers })
                .await;

            let mut data = feed_data(mounted.feed);
            data.insert("stream".into(), serde_json::to_value(&record).unwrap_or_default());
            data.insert("viewers".into(), json!(mounted.viewers));
            Ok(Outcome::Reply(data))
        }
        "part" => match view.unmount().await {
            Some(_) => Ok(Outcome::Done),
            None => Err(req.error_from(&SessionError::NotMounted)),
        },
        "like" => {
            let toggle = view.toggle_like().await.map_err(|e| req.error_from(&e))?;
            Ok(Outcome::Reply(toggle_data("liked", toggle)))
        }
        "follow" => {
            let toggle = view.toggle_follow().await.map_err(|e| req.error_from(&e))?;
            Ok(Outcome::Reply(toggle_data("following", toggle)))
        }
        op => Err(req.error(format!("unknown stream op: {op}"))),
    }
}

// =============================================================================
// CHAT HANDLERS
// =============================================================================

async fn handle_chat(view: &mut StreamView, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "draft" => {
            let text = req.data_str("text").unwrap_or_default().to_string();
            let draft = view.set_draft(text).await.map_err(|e| req.error_from(&e))?;
            Ok(Outcome::Reply(draft_data(draft)))
        }
        "emoji" => {
            let Some(emoji) = req.data_str("emoji").filter(|e| !e.is_empty()) else {
                return Err(req.error("emoji required"));
            };
            let cursor = req
                .data
                .get("cursor")
                .and_then(serde_json::Value::as_u64)
                .and_then(|c| usize::try_from(c).ok());
            let draft = view
                .insert_emoji(emoji.to_string(), cursor)
                .await
                .map_err(|e| req.error_from(&e))?;
            Ok(Outcome::Reply(draft_data(draft)))
        }
        "send" => {
            let text = req.data_str("text").map(str::to_string);
            let submission = view.submit(text).await.map_err(|e| req.error_from(&e))?;
            let mut data = draft_data(submission.draft);
            data.insert("accepted".into(), json!(submission.accepted));
            Ok(Outcome::Reply(data))
        }
        "history" => {
            let entries = view.history().await.map_err(|e| req.error_from(&e))?;
            let mut data = Data::new();
            data.insert("entries".into(), serde_json::to_value(&entries).unwrap_or_default());
            Ok(Outcome::Reply(data))
        }
        op => Err(req.error(format!("unknown chat op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Unsolicited frame for a session event.
fn event_frame(stream_id: &str, event: SessionEvent) -> Frame {
    let frame = match event {
        SessionEvent::Appended(update) => Frame::request("chat:message", feed_data(update)),
        SessionEvent::Viewers(viewers) => Frame::request("stream:viewers", Data::new()).with_data("viewers", viewers),
    };
    frame.with_stream_id(stream_id)
}

fn feed_data(update: FeedUpdate) -> Data {
    let mut data = Data::new();
    data.insert("entries".into(), serde_json::to_value(&update.entries).unwrap_or_default());
    data.insert("scroll_to".into(), json!(update.scroll_to));
    data
}

fn draft_data(draft: String) -> Data {
    let mut data = Data::new();
    data.insert("draft".into(), json!(draft));
    data
}

fn toggle_data(flag: &str, toggle: Toggle) -> Data {
    let mut data = Data::new();
    data.insert(flag.into(), json!(toggle.active));
    if let Some(notice) = toggle.notice {
        data.insert("notice".into(), serde_json::to_value(&notice).unwrap_or_default());
    }
    data
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Ok(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.data_str("code").unwrap_or("-");
        let message = frame.data_str("message").unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else if frame.status.is_terminal() {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
