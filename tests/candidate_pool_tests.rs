//! Candidate pool component tests
//!
//! Properties: case-insensitive dedup, seed exclusion, the escalating
//! fetch passes, the chart fallback, and the empty-pool failure.

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use helpers::{numbered_tracks, track, MockMetadata};
use tunesmith::services::{CandidatePoolBuilder, PoolError};
use tunesmith::types::Track;

fn assert_no_duplicate_keys(pool: &[Track]) {
    let mut seen = std::collections::HashSet::new();
    for track in pool {
        assert!(
            seen.insert(track.key()),
            "duplicate track in pool: {track}"
        );
    }
}

#[tokio::test]
async fn pool_deduplicates_and_excludes_seeds() {
    let seed = track("Karma Police", "Radiohead");
    let similar = vec![
        track("No Surprises", "Radiohead"),
        track("no surprises", "RADIOHEAD"), // same song, different case
        track("KARMA POLICE", "radiohead"), // the seed itself
        track("Exit Music", "Radiohead"),
    ];
    // Plenty of results so similarity alone satisfies the target.
    let mut filler = numbered_tracks("Filler", 40);
    let mut all = similar;
    all.append(&mut filler);

    let metadata = Arc::new(MockMetadata::new().with_similar(&seed, all));
    let builder = CandidatePoolBuilder::new(metadata);

    let pool = builder.build_pool(&[seed.clone()], 10).await.unwrap();

    assert_no_duplicate_keys(&pool);
    assert!(pool.iter().all(|t| t.key() != seed.key()));
    assert!(pool.iter().any(|t| t.title == "No Surprises"));
}

#[tokio::test]
async fn thin_first_pass_triggers_doubled_fetch() {
    let seed = track("Obscure Song", "Obscure Artist");
    let metadata = Arc::new(
        MockMetadata::new()
            .with_similar(&seed, numbered_tracks("Similar", 3))
            .with_top(numbered_tracks("Chart", 40)),
    );
    let builder = CandidatePoolBuilder::new(metadata.clone());

    builder.build_pool(&[seed], 20).await.unwrap();

    // First fan-out returned 3 < 40, so a second fan-out runs per seed.
    assert_eq!(metadata.similar_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn chart_fallback_merges_without_duplicates() {
    let seed = track("Deep Cut", "Niche Band");
    let similar = numbered_tracks("Similar", 2);
    // The chart includes both similarity-derived tracks again.
    let mut chart = similar.clone();
    chart.extend(numbered_tracks("Chart", 38));

    let metadata = Arc::new(
        MockMetadata::new()
            .with_similar(&seed, similar)
            .with_top(chart),
    );
    let builder = CandidatePoolBuilder::new(metadata.clone());

    let pool = builder.build_pool(&[seed], 20).await.unwrap();

    assert!(pool.len() >= 20, "pool too small: {}", pool.len());
    assert_eq!(pool.len(), 40); // 2 similar + 38 new chart entries
    assert_no_duplicate_keys(&pool);
    assert_eq!(metadata.top_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn satisfied_pool_skips_chart() {
    let seed = track("Popular Song", "Famous Artist");
    let metadata = Arc::new(
        MockMetadata::new()
            .with_similar(&seed, numbered_tracks("Similar", 45))
            .with_top(numbered_tracks("Chart", 40)),
    );
    let builder = CandidatePoolBuilder::new(metadata.clone());

    let pool = builder.build_pool(&[seed], 15).await.unwrap();

    assert_eq!(pool.len(), 45);
    assert_eq!(metadata.top_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_after_fallback_is_no_candidates() {
    let seed = track("Unknown", "Nobody");
    let metadata = Arc::new(MockMetadata::new());
    let builder = CandidatePoolBuilder::new(metadata);

    let result = builder.build_pool(&[seed], 20).await;
    assert!(matches!(result, Err(PoolError::NoCandidates)));
}

#[tokio::test]
async fn seed_exclusion_is_idempotent() {
    let seed = track("Seed Song", "Seed Artist");
    let mut similar = numbered_tracks("Similar", 30);
    similar.push(seed.clone());

    let metadata = Arc::new(MockMetadata::new().with_similar(&seed, similar));
    let builder = CandidatePoolBuilder::new(metadata);

    for _ in 0..3 {
        let pool = builder.build_pool(&[seed.clone()], 10).await.unwrap();
        assert!(pool.iter().all(|t| t.key() != seed.key()));
        assert_no_duplicate_keys(&pool);
    }
}

#[tokio::test]
async fn pool_is_capped_at_three_times_target() {
    let seeds = vec![track("A", "X"), track("B", "Y")];
    let metadata = Arc::new(
        MockMetadata::new()
            .with_similar(&seeds[0], numbered_tracks("Left", 40))
            .with_similar(&seeds[1], numbered_tracks("Right", 40)),
    );
    let builder = CandidatePoolBuilder::new(metadata);

    let pool = builder.build_pool(&seeds, 10).await.unwrap();
    assert_eq!(pool.len(), 30);
}
