use fdscript::api;
use fdscript::config::EngineConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fdscript=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting fdscript service");

    let config = EngineConfig::from_env();
    tracing::info!("Using engine: {:?}", config.engine_path);
    if config.engine_path.exists() {
        tracing::info!("Engine found");
    } else {
        tracing::warn!("Engine not found at {:?}", config.engine_path);
        tracing::warn!("Set FEMDESIGN_PATH to the engine executable");
        tracing::warn!("Service will start but reads will fail until the engine is available");
    }
    if let Some(dir) = &config.debug_export {
        tracing::info!("Exporting scripts to {:?}", dir);
    }

    let addr = config.bind_address();
    let app = api::create_router(config);

    tracing::info!("Listening on {}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/v1/version");
    tracing::info!("  POST /api/v1/validate");
    tracing::info!("  POST /api/v1/script");
    tracing::info!("  POST /api/v1/results");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
