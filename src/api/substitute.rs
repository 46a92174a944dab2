//! Single-track substitution endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::prompts::DiscardReason;
use crate::services::{RefinementController, SubstituteContext};
use crate::types::Track;
use crate::{ApiError, ApiResult, AppState};

/// Which flow produced the playlist being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstituteMode {
    Seeded,
    Intention,
}

impl SubstituteMode {
    /// Parse the wire form; unknown values are a caller error, not a
    /// deserialization failure.
    fn parse(mode: &str) -> Option<Self> {
        match mode {
            "seeded" => Some(Self::Seeded),
            "intention" => Some(Self::Intention),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteRequest {
    pub mode: Option<String>,
    pub discarded_song: Option<Track>,
    #[serde(default)]
    pub current_playlist: Vec<Track>,
    #[serde(default)]
    pub seed_songs: Vec<Track>,
    #[serde(default)]
    pub answers: Vec<String>,
    pub analysis: Option<String>,
    pub intention: Option<String>,
    pub discard_reason: Option<DiscardReason>,
}

#[derive(Debug, Serialize)]
pub struct SubstituteResponse {
    pub song: Track,
}

/// POST /api/substitute
///
/// **Request:** `{"mode": "seeded" | "intention", "discardedSong": {...},
/// "currentPlaylist": [...], "seedSongs": [...], "answers": [...],
/// "analysis": "...", "intention": "...", "discardReason": "no-moment" |
/// "no-style"}`
/// **Response:** `{"song": {"name", "artist"}}`
///
/// The replacement excludes the discarded track and every artist already
/// in the playlist.
pub async fn substitute_track(
    State(state): State<AppState>,
    Json(payload): Json<SubstituteRequest>,
) -> ApiResult<Json<SubstituteResponse>> {
    let Some(mode) = payload.mode.as_deref().and_then(SubstituteMode::parse) else {
        return Err(ApiError::BadRequest(
            "mode is required (\"seeded\" or \"intention\")".to_string(),
        ));
    };
    let Some(discarded) = payload.discarded_song else {
        return Err(ApiError::BadRequest("discardedSong is required".to_string()));
    };
    if payload.current_playlist.is_empty() {
        return Err(ApiError::BadRequest(
            "currentPlaylist is required".to_string(),
        ));
    }

    let metadata = state.require_metadata()?;
    let completion = state.require_completion()?;

    let ctx = match mode {
        SubstituteMode::Seeded => SubstituteContext::Seeded {
            seeds: payload.seed_songs,
            answers: payload.answers,
            analysis: payload.analysis,
        },
        SubstituteMode::Intention => {
            let intention = payload.intention.unwrap_or_default();
            if intention.trim().is_empty() {
                return Err(ApiError::BadRequest(
                    "intention is required in intention mode".to_string(),
                ));
            }
            SubstituteContext::Intention {
                intention,
                discard_reason: payload.discard_reason,
            }
        }
    };

    let controller = RefinementController::new(metadata, Some(completion));
    let song = controller
        .substitute(&ctx, &discarded, &payload.current_playlist)
        .await
        .ok_or(ApiError::EmptyPlaylist)?;

    Ok(Json(SubstituteResponse { song }))
}

/// Build substitute routes
pub fn substitute_routes() -> Router<AppState> {
    Router::new().route("/api/substitute", post(substitute_track))
}
