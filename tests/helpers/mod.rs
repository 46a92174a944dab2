//! Shared test doubles for the collaborator trait seams
//!
//! Scripted in-memory implementations of the metadata, completion and
//! video-lookup services, plus small payload builders.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use tunesmith::types::{
    CompletionError, CompletionService, MetadataService, SearchResult, Track, TrackKey,
    VideoLookup,
};
use tunesmith::AppState;

pub fn track(title: &str, artist: &str) -> Track {
    Track::new(title, artist)
}

/// `count` tracks with distinct titles and artists: `{prefix} 0..count`.
pub fn numbered_tracks(prefix: &str, count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| track(&format!("{prefix} {i}"), &format!("{prefix} Artist {i}")))
        .collect()
}

/// Batch completion reply: `{"songs": [{"title", "artist"}]}`.
pub fn songs_json(tracks: &[Track]) -> String {
    let songs: Vec<serde_json::Value> = tracks
        .iter()
        .map(|t| serde_json::json!({"title": t.title, "artist": t.artist}))
        .collect();
    serde_json::json!({ "songs": songs }).to_string()
}

/// Single-track completion reply: `{"title", "artist"}`.
pub fn single_json(track: &Track) -> String {
    serde_json::json!({"title": track.title, "artist": track.artist}).to_string()
}

/// Scripted metadata service.
#[derive(Default)]
pub struct MockMetadata {
    similar: HashMap<TrackKey, Vec<Track>>,
    top: Vec<Track>,
    search: Vec<SearchResult>,
    /// Tracks that fail verification.
    missing: HashSet<TrackKey>,
    /// When set, every verification fails.
    verify_nothing: bool,
    pub similar_calls: AtomicUsize,
    pub top_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similar(mut self, seed: &Track, tracks: Vec<Track>) -> Self {
        self.similar.insert(seed.key(), tracks);
        self
    }

    pub fn with_top(mut self, tracks: Vec<Track>) -> Self {
        self.top = tracks;
        self
    }

    pub fn with_search(mut self, results: Vec<SearchResult>) -> Self {
        self.search = results;
        self
    }

    /// Mark one track as unknown to the service.
    pub fn without(mut self, track: &Track) -> Self {
        self.missing.insert(track.key());
        self
    }

    pub fn verifying_nothing(mut self) -> Self {
        self.verify_nothing = true;
        self
    }
}

#[async_trait::async_trait]
impl MetadataService for MockMetadata {
    async fn track_exists(&self, title: &str, artist: &str) -> bool {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.verify_nothing {
            return false;
        }
        !self.missing.contains(&Track::new(title, artist).key())
    }

    async fn similar_tracks(&self, track: &Track, limit: usize) -> Vec<Track> {
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        self.similar
            .get(&track.key())
            .map(|tracks| tracks.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    async fn top_tracks(&self, limit: usize) -> Vec<Track> {
        self.top_calls.fetch_add(1, Ordering::SeqCst);
        self.top.iter().take(limit).cloned().collect()
    }

    async fn search_tracks(&self, _query: &str, limit: usize) -> Vec<SearchResult> {
        self.search.iter().take(limit).cloned().collect()
    }
}

/// Scripted completion service: a queue of replies, then a fallback.
pub struct MockCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<Result<String, String>>,
    pub calls: AtomicUsize,
}

impl MockCompletion {
    /// Same reply for every call.
    pub fn always(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(Ok(reply.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(Err("connection refused".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripted replies in order; further calls fail.
    pub fn sequence(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripted replies in order; further calls repeat `fallback`.
    pub fn sequence_then(replies: Vec<String>, fallback: &str) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            fallback: Some(Ok(fallback.to_string())),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, _system: &str, _user: Option<&str>) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.replies.lock().await.pop_front();
        let reply = match scripted {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .unwrap_or_else(|| Err("script exhausted".to_string())),
        };

        reply.map_err(CompletionError::Network)
    }
}

/// Scripted video lookup.
pub struct MockVideo {
    pub id: Option<String>,
    pub calls: AtomicUsize,
}

impl MockVideo {
    pub fn returning(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl VideoLookup for MockVideo {
    async fn search_video(&self, _title: &str, _artist: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.id.clone()
    }
}

/// App state wired to the given mocks.
pub fn state_with(
    metadata: Option<Arc<MockMetadata>>,
    completion: Option<Arc<MockCompletion>>,
    video: Option<Arc<MockVideo>>,
) -> AppState {
    AppState::new(
        metadata.map(|m| m as Arc<dyn MetadataService>),
        completion.map(|c| c as Arc<dyn CompletionService>),
        video.map(|v| v as Arc<dyn VideoLookup>),
    )
}
