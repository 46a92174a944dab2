//! Last.fm API client
//!
//! Wraps the audioscrobbler 2.0 web service: track lookup, similar-track
//! search, top chart, and free-text track search. The typed methods return
//! `Result` so failures stay inspectable; the [`MetadataService`] impl at
//! the bottom is the fail-soft boundary the rest of the pipeline consumes.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{MetadataService, SearchResult, Track};

const LASTFM_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";
const USER_AGENT: &str = "tunesmith/0.1.0";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Last.fm client errors
#[derive(Debug, Error)]
pub enum LastfmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Body-level error envelope (`{"error": 6, "message": "..."}`)
    #[error("Service error {0}: {1}")]
    Service(u32, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// `track.getSimilar` / `chart.getTopTracks` entry
#[derive(Debug, Clone, Deserialize)]
struct TrackEntry {
    name: String,
    artist: ArtistRef,
}

#[derive(Debug, Clone, Deserialize)]
struct ArtistRef {
    name: String,
}

impl TrackEntry {
    fn into_track(self) -> Track {
        Track {
            title: self.name,
            artist: self.artist.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimilarEnvelope {
    error: Option<u32>,
    message: Option<String>,
    similartracks: Option<SimilarBody>,
}

#[derive(Debug, Deserialize)]
struct SimilarBody {
    #[serde(default)]
    track: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackInfoEnvelope {
    error: Option<u32>,
    #[allow(dead_code)]
    message: Option<String>,
    track: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    error: Option<u32>,
    message: Option<String>,
    tracks: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    track: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    error: Option<u32>,
    message: Option<String>,
    results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    trackmatches: Option<TrackMatches>,
}

#[derive(Debug, Deserialize)]
struct TrackMatches {
    #[serde(default)]
    track: Vec<SearchEntry>,
}

/// `track.search` entries carry the artist as a plain string and the
/// listener count as a decimal string.
#[derive(Debug, Deserialize)]
struct SearchEntry {
    name: String,
    artist: String,
    listeners: Option<String>,
}

/// Last.fm API client
pub struct LastfmClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl LastfmClient {
    pub fn new(api_key: String) -> Result<Self, LastfmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| LastfmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, LastfmError> {
        let response = self
            .http_client
            .get(LASTFM_BASE_URL)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| LastfmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LastfmError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| LastfmError::Parse(e.to_string()))
    }

    /// `track.getInfo` lookup by exact `(artist, title)` pair.
    ///
    /// `Ok(true)` only when the service answers without an error envelope
    /// and includes a track payload.
    pub async fn track_info(&self, title: &str, artist: &str) -> Result<bool, LastfmError> {
        debug!(title, artist, "Querying Last.fm track.getInfo");

        let envelope: TrackInfoEnvelope = self
            .get_json(&[
                ("method", "track.getInfo"),
                ("artist", artist),
                ("track", title),
            ])
            .await?;

        Ok(envelope.error.is_none() && envelope.track.is_some())
    }

    /// `track.getSimilar` lookup, capped at `limit` results.
    pub async fn similar(&self, track: &Track, limit: usize) -> Result<Vec<Track>, LastfmError> {
        debug!(track = %track, limit, "Querying Last.fm track.getSimilar");

        let limit = limit.to_string();
        let envelope: SimilarEnvelope = self
            .get_json(&[
                ("method", "track.getSimilar"),
                ("artist", track.artist.as_str()),
                ("track", track.title.as_str()),
                ("limit", limit.as_str()),
            ])
            .await?;

        if let Some(code) = envelope.error {
            return Err(LastfmError::Service(
                code,
                envelope.message.unwrap_or_default(),
            ));
        }

        let tracks: Vec<Track> = envelope
            .similartracks
            .map(|body| body.track.into_iter().map(TrackEntry::into_track).collect())
            .unwrap_or_default();

        if tracks.is_empty() {
            debug!(track = %track, "No similar tracks found");
        }

        Ok(tracks)
    }

    /// `chart.getTopTracks`, capped at `limit` results.
    pub async fn chart_top(&self, limit: usize) -> Result<Vec<Track>, LastfmError> {
        debug!(limit, "Querying Last.fm chart.getTopTracks");

        let limit = limit.to_string();
        let envelope: ChartEnvelope = self
            .get_json(&[("method", "chart.getTopTracks"), ("limit", limit.as_str())])
            .await?;

        if let Some(code) = envelope.error {
            return Err(LastfmError::Service(
                code,
                envelope.message.unwrap_or_default(),
            ));
        }

        Ok(envelope
            .tracks
            .map(|body| body.track.into_iter().map(TrackEntry::into_track).collect())
            .unwrap_or_default())
    }

    /// `track.search`, capped at `limit` results.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, LastfmError> {
        debug!(query, limit, "Querying Last.fm track.search");

        let limit = limit.to_string();
        let envelope: SearchEnvelope = self
            .get_json(&[("method", "track.search"), ("track", query), ("limit", limit.as_str())])
            .await?;

        if let Some(code) = envelope.error {
            return Err(LastfmError::Service(
                code,
                envelope.message.unwrap_or_default(),
            ));
        }

        let matches = envelope
            .results
            .and_then(|r| r.trackmatches)
            .map(|m| m.track)
            .unwrap_or_default();

        Ok(matches
            .into_iter()
            .map(|entry| SearchResult {
                name: entry.name,
                artist: entry.artist,
                listeners: entry
                    .listeners
                    .and_then(|l| l.parse().ok())
                    .unwrap_or(0),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl MetadataService for LastfmClient {
    async fn track_exists(&self, title: &str, artist: &str) -> bool {
        match self.track_info(title, artist).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(title, artist, error = %e, "track lookup failed; treating as unknown");
                false
            }
        }
    }

    async fn similar_tracks(&self, track: &Track, limit: usize) -> Vec<Track> {
        match self.similar(track, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(track = %track, error = %e, "similar-tracks lookup failed");
                Vec::new()
            }
        }
    }

    async fn top_tracks(&self, limit: usize) -> Vec<Track> {
        match self.chart_top(limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(error = %e, "top-chart lookup failed");
                Vec::new()
            }
        }
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.search(query, limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query, error = %e, "track search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_similar_tracks_envelope() {
        let json = r#"{
            "similartracks": {
                "track": [
                    {"name": "Fake Plastic Trees", "artist": {"name": "Radiohead"}, "match": 0.92},
                    {"name": "The Drugs Don't Work", "artist": {"name": "The Verve"}}
                ]
            }
        }"#;

        let envelope: SimilarEnvelope = serde_json::from_str(json).unwrap();
        let body = envelope.similartracks.unwrap();
        assert_eq!(body.track.len(), 2);
        assert_eq!(body.track[0].artist.name, "Radiohead");
    }

    #[test]
    fn parses_error_envelope() {
        let json = r#"{"error": 6, "message": "Track not found"}"#;

        let envelope: TrackInfoEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error, Some(6));
        assert!(envelope.track.is_none());
    }

    #[test]
    fn parses_search_envelope_with_string_artist() {
        let json = r#"{
            "results": {
                "trackmatches": {
                    "track": [
                        {"name": "Believe", "artist": "Cher", "listeners": "1043266"}
                    ]
                }
            }
        }"#;

        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        let matches = envelope.results.unwrap().trackmatches.unwrap();
        assert_eq!(matches.track[0].artist, "Cher");
        assert_eq!(matches.track[0].listeners.as_deref(), Some("1043266"));
    }

    #[test]
    fn missing_track_list_parses_as_empty() {
        let json = r#"{"similartracks": {}}"#;

        let envelope: SimilarEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.similartracks.unwrap().track.is_empty());
    }

    #[test]
    fn client_creation() {
        assert!(LastfmClient::new("key".into()).is_ok());
    }
}
