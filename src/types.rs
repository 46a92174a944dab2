//! Core domain types and collaborator trait seams
//!
//! Every external collaborator (music metadata service, chat-completion
//! service, video lookup) is reached through a trait defined here, so the
//! assembly pipeline can be exercised against in-memory substitutes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest playlist the service will produce.
pub const MIN_PLAYLIST_SIZE: usize = 10;
/// Largest playlist the service will produce.
pub const MAX_PLAYLIST_SIZE: usize = 50;
/// Size used when the request does not specify one.
pub const DEFAULT_PLAYLIST_SIZE: usize = 20;

/// Clamp a requested playlist size into the supported range.
///
/// `None` (or an absurd value) never fails; the result is always in
/// `[MIN_PLAYLIST_SIZE, MAX_PLAYLIST_SIZE]`.
pub fn clamp_playlist_size(requested: Option<i64>) -> usize {
    let requested = requested.unwrap_or(DEFAULT_PLAYLIST_SIZE as i64);
    requested.clamp(MIN_PLAYLIST_SIZE as i64, MAX_PLAYLIST_SIZE as i64) as usize
}

/// A song as the rest of the system sees it.
///
/// The wire form uses `name` for the title (the shape the web client and
/// the metadata service exchange). Identity is the case-insensitive
/// `(title, artist)` pair; see [`Track::key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "name")]
    pub title: String,
    pub artist: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Case-insensitive identity key. Two tracks with the same key are the
    /// same song everywhere in the pipeline (dedup, seed exclusion,
    /// backfill).
    pub fn key(&self) -> TrackKey {
        TrackKey(format!(
            "{}|{}",
            self.title.to_lowercase(),
            self.artist.to_lowercase()
        ))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" by {}", self.title, self.artist)
    }
}

/// Dedup key for a track: lowercase `title|artist`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey(String);

/// Completion-service output that has not been checked against the
/// metadata service yet. Must pass the track verifier before it is usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedTrack {
    pub title: String,
    pub artist: String,
}

impl SuggestedTrack {
    pub fn into_track(self) -> Track {
        Track {
            title: self.title,
            artist: self.artist,
        }
    }
}

impl fmt::Display for SuggestedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" by {}", self.title, self.artist)
    }
}

/// One row of metadata-service track search output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub artist: String,
    pub listeners: u64,
}

/// A situational preference question elicited from seed songs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Errors from the completion service.
///
/// These never cross the suggestion-engine boundary; the engine converts
/// every variant into an empty or absent result.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Music metadata service (track lookup, similarity, charts, search).
///
/// All operations degrade to an empty result (or `false`) on transport or
/// parse failure; callers branch on "did I get enough", never on the
/// failure cause.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// `true` iff the service knows a track with this exact
    /// `(artist, title)` pair. Fail-closed: any error means `false`.
    async fn track_exists(&self, title: &str, artist: &str) -> bool;

    /// Tracks similar to the given one, at most `limit` results.
    async fn similar_tracks(&self, track: &Track, limit: usize) -> Vec<Track>;

    /// Current top-chart tracks, at most `limit` results.
    async fn top_tracks(&self, limit: usize) -> Vec<Track>;

    /// Free-text track search, at most `limit` results.
    async fn search_tracks(&self, query: &str, limit: usize) -> Vec<SearchResult>;
}

/// Chat-completion service in JSON-object response mode.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Issue one completion and return the raw content text of the reply.
    async fn complete(&self, system: &str, user: Option<&str>) -> Result<String, CompletionError>;
}

/// Video-lookup collaborator. Consumed only by the player-facing endpoint.
#[async_trait]
pub trait VideoLookup: Send + Sync {
    /// Resolve a `(title, artist)` pair to a video identifier, or `None`
    /// when nothing was found or the lookup failed.
    async fn search_video(&self, title: &str, artist: &str) -> Option<String>;
}
