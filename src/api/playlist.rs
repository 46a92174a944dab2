//! Seed-based playlist generation endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::{PlaylistAssembler, SeededRequest};
use crate::types::{clamp_playlist_size, Question, Track};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    pub analysis: Option<String>,
    pub playlist_size: Option<i64>,
    /// Weave the seed songs back into the result. Additive: the response
    /// may then exceed the requested size.
    #[serde(default)]
    pub include_seed: bool,
    #[serde(default)]
    pub seed_songs: Vec<Track>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: u32,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub playlist: Vec<Track>,
}

/// POST /api/playlist
///
/// **Request:** `{"songs": [...], "questions": [...], "answers": [...],
/// "analysis": "...", "playlistSize": 20, "includeSeed": false,
/// "seedSongs": [...]}`
/// **Response:** `{"playlist": [{"name", "artist"}]}`
pub async fn generate_playlist(
    State(state): State<AppState>,
    Json(payload): Json<PlaylistRequest>,
) -> ApiResult<Json<PlaylistResponse>> {
    if payload.songs.is_empty() {
        return Err(ApiError::BadRequest("songs are required".to_string()));
    }

    let metadata = state.require_metadata()?;
    let target_size = clamp_playlist_size(payload.playlist_size);

    let qa_context = render_qa_context(&payload.questions, &payload.answers);

    let assembler = PlaylistAssembler::new(metadata, state.completion.clone());
    let playlist = assembler
        .assemble_seeded(SeededRequest {
            seeds: payload.songs,
            qa_context,
            analysis: payload.analysis,
            target_size,
            include_seed: payload.include_seed,
            seed_songs: payload.seed_songs,
        })
        .await?;

    Ok(Json(PlaylistResponse { playlist }))
}

/// Pair each question with its answer as a `Q:`/`A:` block for the
/// curation prompt.
fn render_qa_context(questions: &[Question], answers: &[Answer]) -> Option<String> {
    if questions.is_empty() || answers.is_empty() {
        return None;
    }

    let blocks: Vec<String> = questions
        .iter()
        .map(|question| {
            let answer = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .map(|a| a.answer.as_str())
                .unwrap_or("No answer");
            format!("Q: {}\nA: {}", question.text, answer)
        })
        .collect();

    Some(blocks.join("\n\n"))
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new().route("/api/playlist", post(generate_playlist))
}
