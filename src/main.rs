//! tunesmith - Playlist Curation Service
//!
//! HTTP service turning seed songs or a free-text intention into a
//! verified, exact-size playlist via the Last.fm metadata API and a
//! chat-completion service.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tunesmith::config::Config;
use tunesmith::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tunesmith (playlist curation service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve();
    let state = AppState::from_config(&config)?;

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on http://{}", config.bind_addr());
    info!("Health check: http://{}/health", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
