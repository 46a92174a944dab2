//! Track existence verification
//!
//! Confirms a `(title, artist)` pair corresponds to a real track known to
//! the metadata service. Fail-closed: an unverifiable track is never
//! included in a playlist. No retry here: callers recover by asking for
//! a different candidate.

use std::sync::Arc;

use crate::types::MetadataService;

pub struct TrackVerifier {
    metadata: Arc<dyn MetadataService>,
}

impl TrackVerifier {
    pub fn new(metadata: Arc<dyn MetadataService>) -> Self {
        Self { metadata }
    }

    pub async fn verify(&self, title: &str, artist: &str) -> bool {
        self.metadata.track_exists(title, artist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SearchResult, Track};

    struct FixedMetadata {
        exists: bool,
    }

    #[async_trait::async_trait]
    impl MetadataService for FixedMetadata {
        async fn track_exists(&self, _title: &str, _artist: &str) -> bool {
            self.exists
        }

        async fn similar_tracks(&self, _track: &Track, _limit: usize) -> Vec<Track> {
            Vec::new()
        }

        async fn top_tracks(&self, _limit: usize) -> Vec<Track> {
            Vec::new()
        }

        async fn search_tracks(&self, _query: &str, _limit: usize) -> Vec<SearchResult> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn passes_through_service_answer() {
        let verifier = TrackVerifier::new(Arc::new(FixedMetadata { exists: true }));
        assert!(verifier.verify("Pyramid Song", "Radiohead").await);

        let verifier = TrackVerifier::new(Arc::new(FixedMetadata { exists: false }));
        assert!(!verifier.verify("Pyramid Song", "Radiohead").await);
    }
}
