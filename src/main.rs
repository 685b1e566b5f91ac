mod aggregate;
mod config;
mod cycle;
mod fetcher;
mod routes;
mod script;
mod speech;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::cycle::CycleRunner;
use crate::routes::AppState;
use crate::speech::SpeechClient;
use crate::state::StateHolder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newscast=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load("newscast.toml")?;
    info!("Loaded {} sources from configuration", config.sources.len());

    let artifact_dir = Path::new(&config.synthesis.artifact_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // Wire up state and the cycle runner
    let state = Arc::new(StateHolder::new());
    let speech = SpeechClient::from_config(&config.synthesis);
    let runner = Arc::new(CycleRunner::new(config, speech, state.clone()));

    let app_state = Arc::new(AppState { state, runner });

    // Build router
    let app = Router::new()
        .route("/api/state", get(routes::api_state))
        .route("/api/fetch", post(routes::fetch))
        .route("/api/fetch/status", get(routes::fetch_status))
        .route("/api/user", post(routes::set_user))
        .route("/api/podcast", post(routes::set_podcast))
        .route("/api/articles", post(routes::load_articles))
        .route("/api/clear", post(routes::clear))
        .route("/health", get(routes::health))
        .nest_service(cycle::AUDIO_ROUTE, ServeDir::new(artifact_dir))
        .nest_service("/static", ServeDir::new("static"))
        .route_service("/", ServeFile::new("static/index.html"))
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    info!("Dashboard available on http://localhost:8080");

    axum::serve(listener, app).await?;

    Ok(())
}
