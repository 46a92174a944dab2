//! Intention-based discovery endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::{DiscoverRequest, PlaylistAssembler};
use crate::types::{clamp_playlist_size, Track};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequestBody {
    pub intention: Option<String>,
    pub genres: Option<String>,
    #[serde(default)]
    pub reference_songs: Vec<Track>,
    pub playlist_size: Option<i64>,
    #[serde(default)]
    pub surprise_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub playlist: Vec<Track>,
}

/// POST /api/discover
///
/// **Request:** `{"intention": "...", "genres": "...", "referenceSongs":
/// [...], "playlistSize": 20, "surpriseMode": false}`
/// **Response:** `{"playlist": [{"name", "artist"}]}`
///
/// Every suggested track is verified against the metadata service before
/// it enters the playlist; unverifiable suggestions are replaced.
pub async fn discover_playlist(
    State(state): State<AppState>,
    Json(payload): Json<DiscoverRequestBody>,
) -> ApiResult<Json<DiscoverResponse>> {
    let intention = payload.intention.unwrap_or_default();
    if intention.trim().is_empty() {
        return Err(ApiError::BadRequest("intention is required".to_string()));
    }

    let metadata = state.require_metadata()?;
    let completion = state.require_completion()?;
    let target_size = clamp_playlist_size(payload.playlist_size);

    let assembler = PlaylistAssembler::new(metadata, Some(completion));
    let playlist = assembler
        .assemble_discover(DiscoverRequest {
            intention: intention.trim().to_string(),
            genres: payload.genres,
            references: payload.reference_songs,
            target_size,
            surprise: payload.surprise_mode,
        })
        .await?;

    Ok(Json(DiscoverResponse { playlist }))
}

/// Build discover routes
pub fn discover_routes() -> Router<AppState> {
    Router::new().route("/api/discover", post(discover_playlist))
}
