use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::aggregate::Article;
use crate::cycle::CycleRunner;
use crate::script::daily_overview;
use crate::state::StateHolder;

pub struct AppState {
    pub state: Arc<StateHolder>,
    pub runner: Arc<CycleRunner>,
}

// Route handlers
pub async fn api_state(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = app.state.snapshot().await;
    Json(snapshot.as_ref().clone())
}

pub async fn fetch(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    if app.runner.is_running().await {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "message": "A fetch cycle is already in progress"
            })),
        );
    }

    // Run the cycle in the background; the dashboard observes completion
    // through its state poll
    let runner = app.runner.clone();
    tokio::spawn(async move {
        if let Err(e) = runner.run_cycle().await {
            error!("Fetch cycle failed: {}", e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": "Fetching news..."
        })),
    )
}

pub async fn fetch_status(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    let running = app.runner.is_running().await;
    Json(json!({ "running": running }))
}

#[derive(Deserialize)]
pub struct UserPayload {
    pub name: String,
}

pub async fn set_user(
    State(app): State<Arc<AppState>>,
    Json(payload): Json<UserPayload>,
) -> impl IntoResponse {
    app.state.set_user_name(payload.name.clone()).await;
    info!("User name set to: {}", payload.name);
    Json(json!({ "success": true, "user_name": payload.name }))
}

#[derive(Deserialize)]
pub struct PodcastPayload {
    pub url: String,
}

pub async fn set_podcast(
    State(app): State<Arc<AppState>>,
    Json(payload): Json<PodcastPayload>,
) -> impl IntoResponse {
    app.state.set_podcast_link(Some(payload.url.clone())).await;
    info!("Podcast link set to: {}", payload.url);
    Json(json!({ "success": true, "podcast_link": payload.url }))
}

#[derive(Deserialize)]
pub struct ArticlesPayload {
    pub articles: Vec<Article>,
}

/// Load externally supplied articles, as the agent API allows.
pub async fn load_articles(
    State(app): State<Arc<AppState>>,
    Json(payload): Json<ArticlesPayload>,
) -> impl IntoResponse {
    let count = payload.articles.len();
    let summary = daily_overview(&payload.articles);
    app.state.load_articles(payload.articles, summary).await;
    info!("Loaded {} articles", count);
    Json(json!({ "success": true, "count": count }))
}

pub async fn clear(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    app.state.clear().await;
    info!("Dashboard cleared");
    Json(json!({ "success": true }))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
