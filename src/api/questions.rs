//! Question-generation endpoint
//!
//! Elicits 3 situational preference questions from the seed songs, along
//! with an internal analysis string that later calls pass back verbatim.
//! The analysis is never shown to the end user.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::SuggestionEngine;
use crate::types::{Question, Track};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct QuestionsRequest {
    #[serde(default)]
    pub songs: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub analysis: String,
    pub questions: Vec<Question>,
}

/// POST /api/questions
///
/// **Request:** `{"songs": [{"name", "artist"}]}`
/// **Response:** `{"analysis": "...", "questions": [{"id", "text", "options"}]}`
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(payload): Json<QuestionsRequest>,
) -> ApiResult<Json<QuestionsResponse>> {
    if payload.songs.is_empty() {
        return Err(ApiError::BadRequest("songs are required".to_string()));
    }

    let completion = state.require_completion()?;
    let engine = SuggestionEngine::new(Some(completion));

    let (analysis, questions) = engine
        .generate_questions(&payload.songs)
        .await
        .ok_or_else(|| ApiError::Internal("question generation failed".to_string()))?;

    Ok(Json(QuestionsResponse {
        analysis,
        questions,
    }))
}

/// Build question routes
pub fn question_routes() -> Router<AppState> {
    Router::new().route("/api/questions", post(generate_questions))
}
