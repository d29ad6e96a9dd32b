//! Recollect API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use recollect_api::config::AppConfig;
use recollect_api::error::AppError;
use recollect_api::state::AppState;
use recollect_core::clock::SystemClock;
use recollect_gemini::GeminiClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Recollect API server");

    let config = AppConfig::from_env()?;

    let gemini = Arc::new(GeminiClient::new(config.gemini.clone()));
    let app_state = AppState::new(
        Arc::new(SystemClock),
        gemini.clone(),
        gemini,
        config.viewer_buffer,
        &config.language,
        config.initial_profile.clone(),
    );

    let app = recollect_api::app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
