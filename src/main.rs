mod brief;
mod classifier;
mod config;
mod content;
mod credentials;
mod error;
mod gemini;
mod media;
mod models;
mod prompts;
mod routes;
mod schema;
mod service;
mod session;
mod validator;
#[cfg(test)]
mod fixtures;

use axum::{Router, routing::{post, get}};
use routes::{
    analyze_image, analyze_video, create_form, credential_status, delete_form, edit_image, generate, generate_image,
    generate_video, get_form, health, run_task, select_credential, submit_form, AppState,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};

use crate::{config::Config, credentials::KeyStore, gemini::GeminiClient, service::ContentService};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/credentials", get(credential_status).post(select_credential))
        .route("/api/forms", post(create_form))
        .route("/api/forms/:id", get(get_form).delete(delete_form))
        .route("/api/forms/:id/generate", post(submit_form))
        .route("/api/generate", post(generate))
        .route("/api/tasks", post(run_task))
        .route("/api/images/analyze", post(analyze_image))
        .route("/api/images/edit", post(edit_image))
        .route("/api/images/generate", post(generate_image))
        .route("/api/videos/analyze", post(analyze_video))
        .route("/api/videos/generate", post(generate_video))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match &config.api_key {
        Some(key) => tracing::info!("Using API key: {}...", key.chars().take(6).collect::<String>()),
        None => tracing::warn!("No API key configured; select one with POST /api/credentials"),
    }
    tracing::info!("Credential selection policy: {:?}", config.selection_policy);

    let keys = Arc::new(KeyStore::new(config.api_key.clone()));
    let gemini = Arc::new(GeminiClient::new(config.api_base.clone(), keys.clone()));
    let service = ContentService::new(gemini, keys.clone(), config.selection_policy, config.video_poll_interval);
    let state = AppState { forms: Arc::default(), service: Arc::new(service), keys };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
