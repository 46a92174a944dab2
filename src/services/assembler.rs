//! Playlist assembly
//!
//! Reconciles the suggestion engine, the track verifier and the candidate
//! pool into a playlist of an exact target size. The two flows share a
//! result type but diverge completely in construction: the seed-based
//! flow curates over a pool of already-verified candidates and can always
//! fall back to the raw pool, while the intention-based flow verifies
//! every suggestion individually and recovers per-track with replacement
//! requests.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::services::candidate_pool::CandidatePoolBuilder;
use crate::services::prompts;
use crate::services::suggestion::{SuggestionContext, SuggestionEngine};
use crate::services::verifier::TrackVerifier;
use crate::types::{CompletionService, MetadataService, SuggestedTrack, Track, TrackKey};

/// Additional single-replacement requests allowed after the initial
/// suggestions are exhausted.
const TOPUP_ATTEMPTS: usize = 10;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("no candidate tracks could be gathered for the given seeds")]
    NoCandidates,

    #[error("no suggested tracks could be verified")]
    EmptyPlaylist,
}

/// Input for the seed-based flow.
#[derive(Debug, Clone)]
pub struct SeededRequest {
    pub seeds: Vec<Track>,
    /// Pre-rendered Q/A block from the question round, if any.
    pub qa_context: Option<String>,
    /// Opaque internal analysis text from the question round.
    pub analysis: Option<String>,
    pub target_size: usize,
    /// Weave `seed_songs` back into the result. The weave is additive, so
    /// the playlist may exceed `target_size` when this is set.
    pub include_seed: bool,
    pub seed_songs: Vec<Track>,
}

/// Input for the intention-based flow.
#[derive(Debug, Clone)]
pub struct DiscoverRequest {
    pub intention: String,
    pub genres: Option<String>,
    pub references: Vec<Track>,
    pub target_size: usize,
    pub surprise: bool,
}

pub struct PlaylistAssembler {
    pool: CandidatePoolBuilder,
    engine: SuggestionEngine,
    verifier: TrackVerifier,
}

impl PlaylistAssembler {
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

    /// Seed-based assembly: curate over the candidate pool, backfill from
    /// unused candidates, and fall back to the raw pool when curation
    /// fails entirely.
    pub async fn assemble_seeded(&self, req: SeededRequest) -> Result<Vec<Track>, AssembleError> {
        let target = req.target_size;

        let candidates = self
            .pool
            .build_pool(&req.seeds, target)
            .await
            .map_err(|_| AssembleError::NoCandidates)?;

        let ctx = SuggestionContext::Seeded {
            seeds: req.seeds,
            qa_context: req.qa_context,
            analysis: req.analysis,
            candidates: candidates.clone(),
        };

        let curated = self.engine.generate_batch(&ctx, target).await;
        info!(curated = curated.len(), "completion service curated tracks");

        let mut playlist: Vec<Track> = curated.into_iter().map(SuggestedTrack::into_track).collect();

        // Fill up from candidates the curation did not use.
        if playlist.len() < target {
            debug!(
                have = playlist.len(),
                target, "curated playlist short; filling from candidates"
            );
            let mut present: HashSet<TrackKey> = playlist.iter().map(Track::key).collect();
            for track in &candidates {
                if playlist.len() >= target {
                    break;
                }
                if present.insert(track.key()) {
                    playlist.push(track.clone());
                }
            }
        }

        playlist.truncate(target);

        // Last resort: the pool itself, uncurated.
        if playlist.is_empty() {
            playlist = candidates.into_iter().take(target).collect();
        }
        if playlist.is_empty() {
            return Err(AssembleError::EmptyPlaylist);
        }

        if req.include_seed && !req.seed_songs.is_empty() {
            playlist = weave_seeds(playlist, &req.seed_songs);
            info!(total = playlist.len(), "seed songs woven into playlist");
        }

        Ok(playlist)
    }

    /// Intention-based assembly: verify every suggestion, replace the ones
    /// that fail, then top up with bounded extra replacement requests.
    pub async fn assemble_discover(
        &self,
        req: DiscoverRequest,
    ) -> Result<Vec<Track>, AssembleError> {
        let target = req.target_size;

        let ctx = SuggestionContext::Intention {
            intention: req.intention.clone(),
            genres: req.genres.clone(),
            references: req.references.clone(),
            surprise: req.surprise,
        };

        let suggested = self.engine.generate_batch(&ctx, target).await;
        info!(suggested = suggested.len(), "completion service suggested tracks");

        let replacement_prompt =
            prompts::discover_replacement(&req.intention, req.genres.as_deref(), &req.references);

        let mut verified: Vec<Track> = Vec::new();
        let mut tried: Vec<String> = Vec::new();

        for song in suggested {
            tried.push(song.to_string());

            if self.verifier.verify(&song.title, &song.artist).await {
                verified.push(song.into_track());
            } else {
                debug!(song = %song, "suggestion failed verification; requesting replacement");
                if let Some(replacement) =
                    self.verified_replacement(&replacement_prompt, &tried).await
                {
                    tried.push(replacement.to_string());
                    verified.push(replacement.into_track());
                }
            }

            if verified.len() >= target {
                break;
            }
        }

        // Still short: bounded top-up round.
        let mut attempts = 0;
        while verified.len() < target && attempts < TOPUP_ATTEMPTS {
            if let Some(replacement) = self.verified_replacement(&replacement_prompt, &tried).await
            {
                tried.push(replacement.to_string());
                verified.push(replacement.into_track());
            }
            attempts += 1;
        }

        if verified.is_empty() {
            return Err(AssembleError::EmptyPlaylist);
        }

        verified.truncate(target);
        info!(verified = verified.len(), "intention-based playlist assembled");
        Ok(verified)
    }

    /// One replacement request, accepted only when it independently passes
    /// verification.
    async fn verified_replacement(
        &self,
        base_prompt: &str,
        tried: &[String],
    ) -> Option<SuggestedTrack> {
        let song = self.engine.generate_replacement(base_prompt, tried).await?;
        if self.verifier.verify(&song.title, &song.artist).await {
            Some(song)
        } else {
            debug!(song = %song, "replacement failed verification");
            None
        }
    }
}

/// Weave seed songs back into a playlist at roughly even intervals, never
/// at position 0, appending any leftovers. Additive: the result is longer
/// than the input.
pub fn weave_seeds(playlist: Vec<Track>, seeds: &[Track]) -> Vec<Track> {
    let interval = (playlist.len() / (seeds.len() + 1)).max(1);
    let mut woven = Vec::with_capacity(playlist.len() + seeds.len());
    let mut seed_index = 0;

    for (position, track) in playlist.into_iter().enumerate() {
        if seed_index < seeds.len() && position > 0 && position % interval == 0 {
            woven.push(seeds[seed_index].clone());
            seed_index += 1;
        }
        woven.push(track);
    }

    while seed_index < seeds.len() {
        woven.push(seeds[seed_index].clone());
        seed_index += 1;
    }

    woven
}
