//! Track search endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::types::SearchResult;
use crate::{ApiError, ApiResult, AppState};

const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub tracks: Vec<SearchResult>,
}

/// POST /api/search
///
/// **Request:** `{"query": "karma police"}`
/// **Response:** `{"tracks": [{"name", "artist", "listeners"}]}`
///
/// A metadata-service failure degrades to an empty track list.
pub async fn search_tracks(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let query = payload.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is required".to_string()));
    }

    let metadata = state.require_metadata()?;
    let tracks = metadata.search_tracks(query.trim(), SEARCH_LIMIT).await;

    Ok(Json(SearchResponse { tracks }))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", post(search_tracks))
}
