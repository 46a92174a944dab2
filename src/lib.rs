//! tunesmith - Playlist Curation Service
//!
//! Combines a chat-completion service with the Last.fm music metadata API
//! and a YouTube video lookup to produce, refine, and substitute songs
//! within a playlist, driven either by seed songs plus elicited preference
//! questions or by a free-text intention.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::services::{CompletionClient, LastfmClient, VideoResolver, YouTubeClient};
use crate::types::{CompletionService, MetadataService, VideoLookup};

/// Application state shared across handlers
///
/// Each collaborator is optional: a missing credential leaves its slot
/// empty and the endpoints that cannot degrade without it answer 503.
#[derive(Clone)]
pub struct AppState {
    pub metadata: Option<Arc<dyn MetadataService>>,
    pub completion: Option<Arc<dyn CompletionService>>,
    pub video: Option<Arc<VideoResolver>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        metadata: Option<Arc<dyn MetadataService>>,
        completion: Option<Arc<dyn CompletionService>>,
        video_lookup: Option<Arc<dyn VideoLookup>>,
    ) -> Self {
        Self {
            metadata,
            completion,
            video: video_lookup.map(|lookup| Arc::new(VideoResolver::new(lookup))),
            startup_time: Utc::now(),
        }
    }

    /// Build production clients from resolved configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let metadata: Option<Arc<dyn MetadataService>> = match &config.lastfm_api_key {
            Some(key) => {
                info!("Last.fm client configured");
                Some(Arc::new(LastfmClient::new(key.clone())?))
            }
            None => None,
        };

        let completion: Option<Arc<dyn CompletionService>> = match &config.openai_api_key {
            Some(key) => {
                info!("Completion client configured");
                Some(Arc::new(CompletionClient::new(key.clone())?))
            }
            None => None,
        };

        let video_lookup: Option<Arc<dyn VideoLookup>> = match &config.youtube_api_key {
            Some(key) => {
                info!("YouTube client configured");
                Some(Arc::new(YouTubeClient::new(key.clone())?))
            }
            None => None,
        };

        Ok(Self::new(metadata, completion, video_lookup))
    }

    /// Metadata service or 503.
    pub fn require_metadata(&self) -> ApiResult<Arc<dyn MetadataService>> {
        self.metadata.clone().ok_or_else(|| {
            ApiError::ServiceUnavailable("music metadata service is not configured".to_string())
        })
    }

    /// Completion service or 503.
    pub fn require_completion(&self) -> ApiResult<Arc<dyn CompletionService>> {
        self.completion.clone().ok_or_else(|| {
            ApiError::ServiceUnavailable("completion service is not configured".to_string())
        })
    }

    /// Video resolver or 503.
    pub fn require_video(&self) -> ApiResult<Arc<VideoResolver>> {
        self.video.clone().ok_or_else(|| {
            ApiError::ServiceUnavailable("video lookup service is not configured".to_string())
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::search_routes())
        .merge(api::question_routes())
        .merge(api::playlist_routes())
        .merge(api::discover_routes())
        .merge(api::refine_routes())
        .merge(api::substitute_routes())
        .merge(api::video_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
