//! Stream directory routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use tracing::{info, warn};

use super::{ApiError, api_error};
use crate::chat::composer::EMOJI_PALETTE;
use crate::services::catalog::{self, CATEGORIES, CatalogError, Category, NewStream, ShareLinks, StreamRecord};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// `GET /api/streams?category=` — live public streams.
pub async fn list_streams(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<StreamRecord>> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    Json(state.catalog.read().await.list(category))
}

/// `POST /api/streams` — go live with a new stream.
pub async fn create_stream(
    State(state): State<AppState>,
    Json(body): Json<NewStream>,
) -> Result<(StatusCode, Json<StreamRecord>), ApiError> {
    let record = state
        .catalog
        .write()
        .await
        .create(body)
        .map_err(|e| api_error(catalog_error_to_status(&e), &e))?;
    info!(id = %record.id, category = %record.category, private = record.is_private, "stream created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/streams/{id}` — stream record, or the unknown-stream placeholder.
pub async fn get_stream(State(state): State<AppState>, Path(id): Path<String>) -> Json<StreamRecord> {
    Json(state.catalog.read().await.resolve(&id))
}

/// `GET /api/streams/{id}/share` — page URL plus social share links.
pub async fn share_stream(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ShareLinks>, ApiError> {
    let record = state.catalog.read().await.resolve(&id);
    catalog::share_links(&record, &state.config.public_base_url)
        .map(Json)
        .map_err(|e| {
            warn!(error = %e, "share links failed");
            api_error(catalog_error_to_status(&e), &e)
        })
}

/// `GET /api/categories` — the category grid.
pub async fn categories() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

/// `GET /api/emojis` — the emoji picker palette.
pub async fn emojis() -> Json<&'static [&'static str]> {
    Json(EMOJI_PALETTE)
}

pub(crate) fn catalog_error_to_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::MissingInformation | CatalogError::UnknownCategory(_) => StatusCode::BAD_REQUEST,
        CatalogError::InvalidBaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "streams_test.rs"]
mod tests;
