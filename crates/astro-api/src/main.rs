//! AstroGuide API Server
//!
//! REST API server answering astronomy questions.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use astro_api::{create_router, state::AppState};
use astro_core::config::{AppConfig, LoggingConfig};
use astro_guide::create_completion_client;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment wins
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match std::env::var("ASTROGUIDE_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("loading {path}"))?
            .with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);
    config.validate()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create completion client and application state
    let client = create_completion_client(&config.llm)?;
    tracing::info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        temperature = config.llm.temperature,
        max_history_turns = config.guide.max_history_turns,
        "completion client ready"
    );
    let state = Arc::new(AppState::new(config, Arc::from(client)));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("AstroGuide API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        format!("astro_api={level},astro_guide={level},tower_http=debug").into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutdown signal received");
}
