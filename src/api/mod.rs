//! HTTP API handlers
//!
//! One module per endpoint group; each exposes a `*_routes()` builder
//! merged in `build_router`. All payloads are JSON; failures use the
//! `{"error": "..."}` body from [`crate::error::ApiError`].

pub mod discover;
pub mod health;
pub mod playlist;
pub mod questions;
pub mod refine;
pub mod search;
pub mod substitute;
pub mod video;

pub use discover::discover_routes;
pub use health::health_routes;
pub use playlist::playlist_routes;
pub use questions::question_routes;
pub use refine::refine_routes;
pub use search::search_routes;
pub use substitute::substitute_routes;
pub use video::video_routes;
