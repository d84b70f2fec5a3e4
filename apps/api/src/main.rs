use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mini_ai_api::config::Config;
use mini_ai_api::extraction::ExtractionService;
use mini_ai_api::llm_client::{self, ProviderHandle};
use mini_ai_api::routes::{build_router, cors_layer};
use mini_ai_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("mini_ai_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini AI App backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Has API key? {}", config.key_loaded());

    // Provider capability is fixed for the life of the process
    let provider = ProviderHandle::from_config(&config)?;
    if provider.is_configured() {
        info!("Extraction model: {}", llm_client::MODEL);
    }

    let state = AppState {
        extractor: Arc::new(ExtractionService::new(
            provider,
            Duration::from_secs(config.provider_timeout_secs),
        )),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);
    info!("CORS origins: {}", config.cors_origins.join(", "));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Backend running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Cannot listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
