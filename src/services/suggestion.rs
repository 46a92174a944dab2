//! Suggestion engine
//!
//! Wraps the completion service for every curation job: batch generation,
//! single replacement, refinement, and question elicitation. This is the
//! fail-soft boundary for the completion upstream; transport and parse
//! failures degrade to an empty or absent result and never reach callers
//! as errors, because the retry/backfill logic downstream branches on
//! "did I get enough", not on what went wrong.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::prompts;
use crate::types::{CompletionService, Question, SuggestedTrack, Track};

/// Context for one batch-generation job.
#[derive(Debug, Clone)]
pub enum SuggestionContext {
    /// Seed-song curation over a fixed candidate universe.
    Seeded {
        seeds: Vec<Track>,
        qa_context: Option<String>,
        analysis: Option<String>,
        candidates: Vec<Track>,
    },
    /// Free-text intention discovery. `surprise` drops genre/reference
    /// context and asks for deeper cuts.
    Intention {
        intention: String,
        genres: Option<String>,
        references: Vec<Track>,
        surprise: bool,
    },
}

/// Batch reply shape: `{"songs": [{"title", "artist"}]}`. Anything else
/// deserializes to an empty list.
#[derive(Debug, Deserialize)]
struct SongsPayload {
    #[serde(default)]
    songs: Vec<RawSong>,
}

/// Single-track reply shape: `{"title", "artist"}` with both fields
/// required to be non-empty.
#[derive(Debug, Deserialize)]
struct RawSong {
    title: Option<String>,
    artist: Option<String>,
}

impl RawSong {
    fn into_suggested(self) -> Option<SuggestedTrack> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let artist = self.artist.filter(|a| !a.trim().is_empty())?;
        Some(SuggestedTrack { title, artist })
    }
}

#[derive(Debug, Deserialize)]
struct QuestionsPayload {
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// The model sometimes labels the question text `question`, sometimes
/// `text`; accept both.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: Option<u32>,
    question: Option<String>,
    text: Option<String>,
    #[serde(default)]
    options: Vec<String>,
}

/// Suggestion engine over an optional completion service. An absent
/// service behaves exactly like a failing one: every job degrades.
pub struct SuggestionEngine {
    completion: Option<Arc<dyn CompletionService>>,
}

impl SuggestionEngine {
    pub fn new(completion: Option<Arc<dyn CompletionService>>) -> Self {
        Self { completion }
    }

    /// Generate a batch of unverified suggestions for the given context.
    /// Returns an empty batch on any failure.
    pub async fn generate_batch(
        &self,
        ctx: &SuggestionContext,
        target_size: usize,
    ) -> Vec<SuggestedTrack> {
        let Some(completion) = &self.completion else {
            warn!("completion service not configured; skipping suggestion batch");
            return Vec::new();
        };

        let (system, user) = match ctx {
            SuggestionContext::Seeded {
                seeds,
                qa_context,
                analysis,
                candidates,
            } => prompts::seeded_batch(
                seeds,
                analysis.as_deref(),
                qa_context.as_deref(),
                candidates,
                target_size,
            ),
            SuggestionContext::Intention {
                intention,
                surprise: true,
                ..
            } => prompts::surprise_batch(intention, target_size),
            SuggestionContext::Intention {
                intention,
                genres,
                references,
                surprise: false,
            } => prompts::intention_batch(intention, genres.as_deref(), references, target_size),
        };

        match completion.complete(&system, Some(&user)).await {
            Ok(text) => parse_songs(&text),
            Err(e) => {
                warn!(error = %e, "suggestion batch failed");
                Vec::new()
            }
        }
    }

    /// Ask for exactly one song matching `base_prompt`, excluding every
    /// entry of `excluded`. Returns `None` on any failure; callers treat
    /// that as "no replacement available this attempt".
    pub async fn generate_replacement(
        &self,
        base_prompt: &str,
        excluded: &[String],
    ) -> Option<SuggestedTrack> {
        let Some(completion) = &self.completion else {
            warn!("completion service not configured; no replacement available");
            return None;
        };

        let system = prompts::with_exclusions(base_prompt, excluded);

        match completion.complete(&system, None).await {
            Ok(text) => parse_single(&text),
            Err(e) => {
                warn!(error = %e, "replacement suggestion failed");
                None
            }
        }
    }

    /// Evolve an existing playlist per listener feedback, choosing from
    /// the candidate pool. Returns an empty batch on any failure.
    pub async fn refine_batch(
        &self,
        seeds: &[Track],
        current: &[Track],
        feedback: &str,
        candidates: &[Track],
        target_size: usize,
    ) -> Vec<SuggestedTrack> {
        let Some(completion) = &self.completion else {
            warn!("completion service not configured; skipping refinement");
            return Vec::new();
        };

        let (system, user) = prompts::refine(seeds, current, feedback, candidates, target_size);

        match completion.complete(&system, Some(&user)).await {
            Ok(text) => parse_songs(&text),
            Err(e) => {
                warn!(error = %e, "refinement batch failed");
                Vec::new()
            }
        }
    }

    /// Elicit the internal analysis and 3 situational questions for the
    /// given seeds. `None` on any failure.
    pub async fn generate_questions(
        &self,
        seeds: &[Track],
    ) -> Option<(String, Vec<Question>)> {
        let completion = self.completion.as_ref()?;

        let (system, user) = prompts::questions(seeds);

        let text = match completion.complete(&system, Some(&user)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "question generation failed");
                return None;
            }
        };

        let payload: QuestionsPayload = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "unparseable questions payload");
                return None;
            }
        };

        let questions = payload
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Question {
                id: raw.id.unwrap_or(index as u32 + 1),
                text: raw.question.or(raw.text).unwrap_or_default(),
                options: raw.options,
            })
            .collect();

        Some((payload.analysis, questions))
    }
}

fn parse_songs(text: &str) -> Vec<SuggestedTrack> {
    match serde_json::from_str::<SongsPayload>(text) {
        Ok(payload) => {
            let songs: Vec<SuggestedTrack> = payload
                .songs
                .into_iter()
                .filter_map(RawSong::into_suggested)
                .collect();
            debug!(count = songs.len(), "parsed suggestion batch");
            songs
        }
        Err(e) => {
            warn!(error = %e, "unparseable suggestion payload");
            Vec::new()
        }
    }
}

fn parse_single(text: &str) -> Option<SuggestedTrack> {
    match serde_json::from_str::<RawSong>(text) {
        Ok(raw) => raw.into_suggested(),
        Err(e) => {
            warn!(error = %e, "unparseable replacement payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompletionError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedCompletion {
        reply: Result<String, ()>,
        calls: AtomicUsize,
    }

    impl FixedCompletion {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionService for FixedCompletion {
        async fn complete(
            &self,
            _system: &str,
            _user: Option<&str>,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .map_err(|_| CompletionError::Network("connection refused".into()))
        }
    }

    fn engine(completion: FixedCompletion) -> SuggestionEngine {
        SuggestionEngine::new(Some(Arc::new(completion)))
    }

    fn intention_ctx() -> SuggestionContext {
        SuggestionContext::Intention {
            intention: "rainy study afternoon".into(),
            genres: None,
            references: Vec::new(),
            surprise: false,
        }
    }

    #[tokio::test]
    async fn batch_parses_songs_shape() {
        let engine = engine(FixedCompletion::ok(
            r#"{"songs": [{"title": "Holocene", "artist": "Bon Iver"}, {"title": "Re: Stacks", "artist": "Bon Iver"}]}"#,
        ));

        let batch = engine.generate_batch(&intention_ctx(), 20).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].title, "Holocene");
    }

    #[tokio::test]
    async fn batch_degrades_on_transport_failure() {
        let engine = engine(FixedCompletion::failing());
        assert!(engine.generate_batch(&intention_ctx(), 20).await.is_empty());
    }

    #[tokio::test]
    async fn batch_degrades_on_wrong_shape() {
        let engine = engine(FixedCompletion::ok(r#"{"playlist": "not songs"}"#));
        assert!(engine.generate_batch(&intention_ctx(), 20).await.is_empty());

        let engine = engine_from_text("not json at all");
        assert!(engine.generate_batch(&intention_ctx(), 20).await.is_empty());
    }

    fn engine_from_text(text: &str) -> SuggestionEngine {
        engine(FixedCompletion::ok(text))
    }

    #[tokio::test]
    async fn batch_drops_songs_with_missing_fields() {
        let engine = engine(FixedCompletion::ok(
            r#"{"songs": [{"title": "Myth"}, {"title": "Lazuli", "artist": "Beach House"}, {"artist": "Beach House"}, {"title": " ", "artist": "x"}]}"#,
        ));

        let batch = engine.generate_batch(&intention_ctx(), 20).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].title, "Lazuli");
    }

    #[tokio::test]
    async fn replacement_requires_both_fields() {
        let engine_missing = engine(FixedCompletion::ok(r#"{"title": "Avril 14th"}"#));
        assert!(engine_missing.generate_replacement("base", &[]).await.is_none());

        let engine = engine(FixedCompletion::ok(
            r#"{"title": "Avril 14th", "artist": "Aphex Twin"}"#,
        ));
        let replacement = engine.generate_replacement("base", &[]).await.unwrap();
        assert_eq!(replacement.artist, "Aphex Twin");
    }

    #[tokio::test]
    async fn unconfigured_engine_degrades() {
        let engine = SuggestionEngine::new(None);
        assert!(engine.generate_batch(&intention_ctx(), 20).await.is_empty());
        assert!(engine.generate_replacement("base", &[]).await.is_none());
        assert!(engine.generate_questions(&[]).await.is_none());
    }

    #[tokio::test]
    async fn questions_assign_positional_ids() {
        let engine = engine(FixedCompletion::ok(
            r#"{
                "analysis": "internal notes",
                "questions": [
                    {"question": "What moment is this for?", "options": ["a", "b", "c", "d", "Something else: ___"]},
                    {"text": "How should it leave you?", "options": []}
                ]
            }"#,
        ));

        let (analysis, questions) = engine.generate_questions(&[]).await.unwrap();
        assert_eq!(analysis, "internal notes");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[1].id, 2);
        assert_eq!(questions[1].text, "How should it leave you?");
    }
}
