mod analysis;
mod config;
mod engine;
mod errors;
mod explain;
mod extraction;
mod llm_client;
mod profile;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::engine::config::EngineConfig;
use crate::engine::ScoringEngine;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skillmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Scoring configuration: built-in defaults unless a file is given
    let engine_config = match &config.scoring_config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load scoring configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = ScoringEngine::new(engine_config)?;
    info!(
        policy = ?engine.config().headline_policy,
        synonyms = engine.config().synonyms.len(),
        keywords = engine.config().ats_keywords.len(),
        "Scoring engine initialized"
    );

    // LLM collaborators only when a key is configured
    let llm = match &config.gemini_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.gemini_model.clone())?;
            info!("LLM client initialized (model: {})", client.model());
            Some(client)
        }
        None => {
            warn!("GEMINI_API_KEY not set; using dictionary extraction and template explanations");
            None
        }
    };

    let state = AppState::new(config.clone(), engine, llm);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
