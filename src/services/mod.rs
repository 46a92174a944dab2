//! Service modules for the playlist-curation pipeline
//!
//! External-service clients (Last.fm, chat completions, YouTube) and the
//! orchestration components built on top of them.

pub mod assembler;
pub mod candidate_pool;
pub mod completion;
pub mod lastfm;
pub mod prompts;
pub mod refinement;
pub mod suggestion;
pub mod verifier;
pub mod video_resolver;
pub mod youtube;

pub use assembler::{AssembleError, DiscoverRequest, PlaylistAssembler, SeededRequest};
pub use candidate_pool::{CandidatePoolBuilder, PoolError};
pub use completion::CompletionClient;
pub use lastfm::{LastfmClient, LastfmError};
pub use refinement::{RefinementController, SubstituteContext};
pub use suggestion::{SuggestionContext, SuggestionEngine};
pub use verifier::TrackVerifier;
pub use video_resolver::VideoResolver;
pub use youtube::YouTubeClient;
