//! Playlist refinement endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::RefinementController;
use crate::types::{clamp_playlist_size, Track};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    #[serde(default)]
    pub seeds: Vec<Track>,
    #[serde(default)]
    pub current_playlist: Vec<Track>,
    pub feedback: Option<String>,
    pub playlist_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub playlist: Vec<Track>,
}

/// POST /api/refine
///
/// **Request:** `{"seeds": [...], "currentPlaylist": [...], "feedback":
/// "...", "playlistSize": 20}`
/// **Response:** `{"playlist": [{"name", "artist"}]}`
///
/// The refined playlist is an evolution of the current one. A completion
/// failure alone never fails the call; the candidate pool backfill then
/// determines the outcome, and only an empty result is an error.
pub async fn refine_playlist(
    State(state): State<AppState>,
    Json(payload): Json<RefineRequest>,
) -> ApiResult<Json<RefineResponse>> {
    let feedback = payload.feedback.unwrap_or_default();
    if payload.seeds.is_empty() || payload.current_playlist.is_empty() || feedback.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "seeds, currentPlaylist and feedback are required".to_string(),
        ));
    }

    let metadata = state.require_metadata()?;
    let target_size = clamp_playlist_size(payload.playlist_size);

    let controller = RefinementController::new(metadata, state.completion.clone());
    let playlist = controller
        .refine(
            &payload.seeds,
            &payload.current_playlist,
            feedback.trim(),
            target_size,
        )
        .await;

    if playlist.is_empty() {
        return Err(ApiError::EmptyPlaylist);
    }

    Ok(Json(RefineResponse { playlist }))
}

/// Build refine routes
pub fn refine_routes() -> Router<AppState> {
    Router::new().route("/api/refine", post(refine_playlist))
}
