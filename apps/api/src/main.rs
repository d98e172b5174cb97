mod alerts;
mod analysis;
mod config;
mod errors;
mod llm_client;
mod output_log;
mod prompts;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::VertexClient;
use crate::output_log::OutputLog;
use crate::prompts::store::PromptStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting WISE API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Vertex AI client
    let llm = VertexClient::new(&config)?;
    match &config.project_id {
        Some(project) => info!(
            "Vertex AI client initialized (model: {}, project: {}, location: {})",
            llm_client::MODEL,
            project,
            config.location
        ),
        None => warn!("GOOGLE_CLOUD_PROJECT_ID is not set; generation endpoints will fail"),
    }

    let prompts = PromptStore::new(&config.prompts_dir);
    info!("Prompt templates directory: {}", prompts.dir().display());

    let output_log = OutputLog::new(&config.outputs_dir);
    info!("Model outputs directory: {}", output_log.dir().display());

    let state = AppState {
        config: config.clone(),
        llm: Arc::new(llm),
        prompts: Arc::new(prompts),
        output_log,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
