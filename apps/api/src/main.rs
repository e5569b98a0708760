mod assessment;
mod coding;
mod config;
mod db;
mod errors;
mod generation;
mod interview;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::generation::Generator;
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

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

    info!("Starting prepdeck API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence: PostgreSQL when configured, otherwise in-process tables
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    // LLM client. An absent key still builds a client; the credential gate
    // keeps it from ever being called.
    let llm = OpenAiClient::new(
        config.openai_api_key.clone().unwrap_or_default(),
        Some(config.openai_api_base.clone()),
        config.openai_model_name.clone(),
    )?;
    info!(
        "LLM client initialized (model: {}, base: {})",
        llm.model(),
        config.openai_api_base
    );
    let generator = Generator::new(Arc::new(llm), config.openai_api_key.as_deref());

    let state = AppState { store, generator };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
