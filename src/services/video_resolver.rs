//! Video-id resolution with a process-wide cache
//!
//! The `(title, artist) → video id` mapping is treated as effectively
//! immutable, so the cache is populate-on-miss with no eviction and no
//! persistence; losing it on restart only costs redundant lookups.
//! Concurrent writers may race; the worst outcome is one extra external
//! lookup, never incorrect data.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::VideoLookup;

pub struct VideoResolver {
    lookup: Arc<dyn VideoLookup>,
    cache: RwLock<HashMap<String, String>>,
}

impl VideoResolver {
    pub fn new(lookup: Arc<dyn VideoLookup>) -> Self {
        Self {
            lookup,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(title: &str, artist: &str) -> String {
        format!("{}::{}", artist.to_lowercase(), title.to_lowercase())
    }

    /// Resolve a video id, serving from cache when possible.
    pub async fn resolve(&self, title: &str, artist: &str) -> Option<String> {
        let key = Self::cache_key(title, artist);

        if let Some(hit) = self.cache.read().await.get(&key) {
            debug!(title, artist, "video cache hit");
            return Some(hit.clone());
        }

        let video_id = self.lookup.search_video(title, artist).await?;
        debug!(title, artist, video_id, "video resolved and cached");

        self.cache
            .write()
            .await
            .insert(key, video_id.clone());

        Some(video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        id: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl VideoLookup for CountingLookup {
        async fn search_video(&self, _title: &str, _artist: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.id.clone()
        }
    }

    #[tokio::test]
    async fn second_resolve_hits_cache() {
        let lookup = Arc::new(CountingLookup {
            id: Some("abc123".to_string()),
            calls: AtomicUsize::new(0),
        });
        let resolver = VideoResolver::new(lookup.clone());

        assert_eq!(resolver.resolve("Go", "Moby").await.as_deref(), Some("abc123"));
        assert_eq!(resolver.resolve("GO", "MOBY").await.as_deref(), Some("abc123"));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn miss_is_not_cached() {
        let lookup = Arc::new(CountingLookup {
            id: None,
            calls: AtomicUsize::new(0),
        });
        let resolver = VideoResolver::new(lookup.clone());

        assert!(resolver.resolve("Go", "Moby").await.is_none());
        assert!(resolver.resolve("Go", "Moby").await.is_none());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }
}
