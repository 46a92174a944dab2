//! YouTube Data API client
//!
//! Resolves a `(title, artist)` pair to a single music-category video id.
//! Fail-soft: any transport or parse failure is `None`.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::VideoLookup;

const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const MUSIC_CATEGORY_ID: &str = "10";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// YouTube search client
pub struct YouTubeClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl VideoLookup for YouTubeClient {
    async fn search_video(&self, title: &str, artist: &str) -> Option<String> {
        let query = format!("{title} {artist} official audio");
        debug!(query, "Querying YouTube search");

        let response = match self
            .http_client
            .get(YOUTUBE_SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("q", query.as_str()),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "YouTube search request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "YouTube search returned an error status");
            return None;
        }

        let envelope: SearchEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "YouTube search response unparseable");
                return None;
            }
        };

        let video_id = envelope
            .items
            .into_iter()
            .next()
            .and_then(|item| item.id.video_id);

        if video_id.is_none() {
            debug!(title, artist, "no video found");
        }

        video_id
    }
}
