//! stylesense HTTP server.

use std::sync::Arc;

use tracing::{info, warn};

use stylesense_api::{build_router, telemetry, AppState, ServerConfig};
use stylesense_db::{log_pool_metrics, Database};
use stylesense_inference::{GeminiProvider, TryOnConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _log_guard = telemetry::init_tracing();

    let config = ServerConfig::from_env();

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    info!(database_url = %config.database_url, "Database ready");
    log_pool_metrics(&db.pool);

    let provider = GeminiProvider::from_env()?;
    if provider.config().api_key.is_none() && provider.config().pro_api_key.is_none() {
        warn!("No Gemini API key configured; AI features need a key supplied per request");
    }

    let tryon = TryOnConfig::from_env();
    info!(
        step_delay_ms = tryon.step_delay.as_millis() as u64,
        max_attempts = tryon.max_attempts(),
        "Try-on pacing configured"
    );

    let state = AppState::new(db, Arc::new(provider), tryon);
    let app = build_router(state, &config);

    // Start server
    let addr = config.socket_addr()?;
    if let Some(dir) = &config.static_dir {
        info!(static_dir = %dir.display(), "Serving SPA bundle");
    }
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
