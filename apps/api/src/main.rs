mod chat;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod projects;
mod routes;
mod state;
mod usage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::{CompletionProvider, GroqClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wiki Chat API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the completion provider. A missing key keeps the server up;
    // /chat answers 500 until it is configured.
    let llm: Option<Arc<dyn CompletionProvider>> = match &config.groq_api_key {
        Some(key) => {
            let client = GroqClient::new(
                key.clone(),
                &config.groq_base_url,
                config.limits.request_timeout,
            )?;
            info!(
                "LLM client initialized (models: {} → {})",
                config.primary_model, config.fallback_model
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("GROQ_API_KEY is not set; /chat will answer with a configuration error");
            None
        }
    };

    if config.api_key.is_some() {
        info!("Caller API key required on /chat");
    }

    // Initialize PostgreSQL (optional)
    let db = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            init_schema(&pool).await?;
            Some(pool)
        }
        None => {
            warn!("DATABASE_URL is not set; project and usage routes are disabled");
            None
        }
    };

    let port = config.port;
    let state = AppState::new(config, llm, db);

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
