//! Playlist refinement and single-track substitution
//!
//! Both operations take an existing playlist plus user feedback and reuse
//! the candidate pool builder, the suggestion engine and the track
//! verifier. Refinement is an evolution of the current playlist, not a
//! regeneration; substitution swaps exactly one track under artist-level
//! exclusion.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::services::candidate_pool::CandidatePoolBuilder;
use crate::services::prompts::{self, DiscardReason};
use crate::services::suggestion::SuggestionEngine;
use crate::services::verifier::TrackVerifier;
use crate::types::{CompletionService, MetadataService, SuggestedTrack, Track, TrackKey};

/// Replacement attempts per substitution before giving up.
const SUBSTITUTE_ATTEMPTS: usize = 5;

/// Mode-specific context for a substitution.
#[derive(Debug, Clone)]
pub enum SubstituteContext {
    /// Seed-based playlist: seeds + answers + internal analysis.
    Seeded {
        seeds: Vec<Track>,
        answers: Vec<String>,
        analysis: Option<String>,
    },
    /// Intention-based playlist: the intention, with an optional reason
    /// the listener discarded the track.
    Intention {
        intention: String,
        discard_reason: Option<DiscardReason>,
    },
}

pub struct RefinementController {
    pool: CandidatePoolBuilder,
    engine: SuggestionEngine,
    verifier: TrackVerifier,
}

impl RefinementController {
    pub fn new(
        metadata: Arc<dyn MetadataService>,
        completion: Option<Arc<dyn CompletionService>>,
    ) -> Self {
        Self {
            pool: CandidatePoolBuilder::new(metadata.clone()),
            engine: SuggestionEngine::new(completion),
            verifier: TrackVerifier::new(metadata),
        }
    }

    /// Evolve `current` per the feedback text. A failed completion call
    /// never fails the whole operation: the candidate pool backfill alone
    /// then determines the outcome, down to and including an empty result
    /// (which callers surface as a failure).
    pub async fn refine(
        &self,
        seeds: &[Track],
        current: &[Track],
        feedback: &str,
        target_size: usize,
    ) -> Vec<Track> {
        let candidates = match self.pool.build_pool(seeds, target_size).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "refinement pool empty; relying on completion output only");
                Vec::new()
            }
        };

        let refined = self
            .engine
            .refine_batch(seeds, current, feedback, &candidates, target_size)
            .await;
        info!(refined = refined.len(), "completion service refined tracks");

        let mut playlist: Vec<Track> =
            refined.into_iter().map(SuggestedTrack::into_track).collect();

        if playlist.len() < target_size {
            debug!(
                have = playlist.len(),
                target_size, "refined playlist short; filling from candidates"
            );
            let mut present: HashSet<TrackKey> = playlist.iter().map(Track::key).collect();
            for track in &candidates {
                if playlist.len() >= target_size {
                    break;
                }
                if present.insert(track.key()) {
                    playlist.push(track.clone());
                }
            }
        }

        playlist.truncate(target_size);
        playlist
    }

    /// Find one verified replacement for `discarded`, excluding every
    /// artist already in `current`. `None` when the attempt budget runs
    /// out without a verified hit.
    pub async fn substitute(
        &self,
        ctx: &SubstituteContext,
        discarded: &Track,
        current: &[Track],
    ) -> Option<Track> {
        let base_prompt = match ctx {
            SubstituteContext::Seeded {
                seeds,
                answers,
                analysis,
            } => prompts::substitute_seeded(seeds, analysis.as_deref(), answers, current, discarded),
            SubstituteContext::Intention {
                intention,
                discard_reason,
            } => prompts::substitute_intention(intention, current, discarded, *discard_reason),
        };

        let mut tried: Vec<String> = vec![discarded.to_string()];

        for attempt in 0..SUBSTITUTE_ATTEMPTS {
            if let Some(song) = self.engine.generate_replacement(&base_prompt, &tried).await {
                if self.verifier.verify(&song.title, &song.artist).await {
                    info!(song = %song, "substitute found");
                    return Some(song.into_track());
                }
                debug!(attempt, song = %song, "substitute failed verification; retrying");
                tried.push(song.to_string());
            }
        }

        warn!(discarded = %discarded, "no verified substitute within attempt budget");
        None
    }
}
