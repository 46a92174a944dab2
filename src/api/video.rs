//! Video-lookup endpoint
//!
//! Resolves a song to a playable video id for the player collaborator.
//! Results are cached process-wide; a missing video is a `null` id, not
//! an error.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub song: Option<VideoSong>,
}

#[derive(Debug, Deserialize)]
pub struct VideoSong {
    pub name: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub video_id: Option<String>,
}

/// POST /api/video
///
/// **Request:** `{"song": {"name": "...", "artist": "..."}}`
/// **Response:** `{"videoId": "..." | null}`
pub async fn lookup_video(
    State(state): State<AppState>,
    Json(payload): Json<VideoRequest>,
) -> ApiResult<Json<VideoResponse>> {
    let song = payload
        .song
        .ok_or_else(|| ApiError::BadRequest("song with name and artist is required".to_string()))?;

    let (Some(name), Some(artist)) = (song.name, song.artist) else {
        return Err(ApiError::BadRequest(
            "song with name and artist is required".to_string(),
        ));
    };

    let resolver = state.require_video()?;
    let video_id = resolver.resolve(&name, &artist).await;

    Ok(Json(VideoResponse { video_id }))
}

/// Build video routes
pub fn video_routes() -> Router<AppState> {
    Router::new().route("/api/video", post(lookup_video))
}
