//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the stream directory REST endpoints, the stream-view websocket and
//! the assistant SSE endpoint under a single Axum router. Everything is
//! served under `/api` apart from `/healthz`.

pub mod assistant;
pub mod streams;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::json;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::frame::ErrorCode;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // SSE is streamed uncompressed; gzip would buffer deltas.
    let directory = Router::new()
        .route("/api/streams", get(streams::list_streams).post(streams::create_stream))
        .route("/api/streams/{id}", get(streams::get_stream))
        .route("/api/streams/{id}/share", get(streams::share_stream))
        .route("/api/categories", get(streams::categories))
        .route("/api/emojis", get(streams::emojis))
        .layer(CompressionLayer::new());

    Router::new()
        .merge(directory)
        .route("/api/chat", post(assistant::chat))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// JSON error body shared by the REST handlers.
pub(crate) type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn api_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> ApiError {
    (status, Json(json!({ "code": err.error_code(), "message": err.to_string() })))
}
