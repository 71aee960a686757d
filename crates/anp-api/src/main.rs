//! # anp-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the ANP demo agent.
//! Binds to the configured host and port (default 0.0.0.0:8000).

use anp_api::config::AppConfig;
use anp_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment (ANP_* variables).
    let config = AppConfig::from_env();

    for finding in config.validate() {
        tracing::warn!("configuration: {finding}");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config).map_err(|e| {
        tracing::error!("State initialization failed: {e}");
        e
    })?;

    let app = anp_api::app(state);

    tracing::info!("ANP agent service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
