//! Candidate pool construction
//!
//! Gathers a deduplicated, seed-excluding pool of plausible candidate
//! tracks from the metadata service. Similarity search is sparse for
//! niche seeds, so the pool is built in three escalating passes: one
//! similar-tracks fan-out per seed, a second doubled-limit fan-out when
//! the first came back thin, and a top-chart fallback when the pool is
//! still below the target size. Tracks are never fabricated; everything
//! here came from the metadata service.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{MetadataService, Track, TrackKey};

#[derive(Debug, Error)]
pub enum PoolError {
    /// Both similarity passes and the chart fallback produced nothing.
    #[error("no candidate tracks found for the given seeds")]
    NoCandidates,
}

pub struct CandidatePoolBuilder {
    metadata: Arc<dyn MetadataService>,
}

impl CandidatePoolBuilder {
    pub fn new(metadata: Arc<dyn MetadataService>) -> Self {
        Self { metadata }
    }

    /// Build a candidate pool of at most `target_size * 3` tracks (plus
    /// chart fallback entries when the similarity passes fall short of
    /// `target_size`). No candidate ever equals a seed, and no two
    /// candidates share a case-insensitive `(title, artist)` key.
    pub async fn build_pool(
        &self,
        seeds: &[Track],
        target_size: usize,
    ) -> Result<Vec<Track>, PoolError> {
        if seeds.is_empty() {
            return Err(PoolError::NoCandidates);
        }

        let per_seed_limit = (target_size * 3).div_ceil(seeds.len());

        // First fan-out: one similar-tracks call per seed, all in flight
        // before any is awaited.
        let fetches = seeds
            .iter()
            .map(|seed| self.metadata.similar_tracks(seed, per_seed_limit));
        let mut flat: Vec<Track> = join_all(fetches).await.into_iter().flatten().collect();

        // Thin result: fan out again with double the limit and keep both
        // result sets.
        if flat.len() < target_size * 2 {
            debug!(
                fetched = flat.len(),
                "similarity results thin; fetching again with doubled limit"
            );
            let fetches = seeds
                .iter()
                .map(|seed| self.metadata.similar_tracks(seed, per_seed_limit * 2));
            flat.extend(join_all(fetches).await.into_iter().flatten());
        }

        let seed_keys: HashSet<TrackKey> = seeds.iter().map(Track::key).collect();
        let mut seen: HashSet<TrackKey> = HashSet::new();
        let mut pool: Vec<Track> = Vec::new();

        for track in flat {
            let key = track.key();
            if seed_keys.contains(&key) || !seen.insert(key) {
                continue;
            }
            pool.push(track);
        }

        pool.truncate(target_size * 3);

        info!(candidates = pool.len(), "candidate pool from similarity");

        // Fallback: top up from the chart, still deduplicating against
        // everything seen so far.
        if pool.len() < target_size {
            info!(
                candidates = pool.len(),
                target_size, "not enough candidates; fetching top chart as fallback"
            );
            let chart = self.metadata.top_tracks(target_size * 2).await;
            for track in chart {
                let key = track.key();
                if seed_keys.contains(&key) || !seen.insert(key) {
                    continue;
                }
                pool.push(track);
            }
            info!(candidates = pool.len(), "candidate pool after chart fallback");
        }

        if pool.is_empty() {
            return Err(PoolError::NoCandidates);
        }

        Ok(pool)
    }
}
