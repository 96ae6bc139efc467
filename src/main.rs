use price_feed_api::{create_router, FeedConfig, FeedState};
use std::future::IntoFuture;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_feed_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = FeedConfig::from_env()?;
    let addr = config.socket_addr()?;

    // Shared simulator + session registry
    let state = FeedState::from_config(&config);
    if let Some(seed) = config.price_seed {
        tracing::info!("🎲 Price simulator seeded with {}", seed);
    }

    // Start the periodic tick and fan-out
    let broadcast_handle = state.start_broadcasting();

    let app = create_router(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Price feed server running on http://{}", addr);
    tracing::info!("📊 Health check: http://{}/health", addr);
    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", addr);
    tracing::info!("🔌 WebSocket: ws://{}/ws", addr);
    tracing::info!("📁 Static assets: {}", config.static_dir);
    tracing::info!("⏱️  Tick interval: {} ms", config.tick_interval_ms);
    tracing::info!("");
    tracing::info!("📡 WebSocket examples:");
    tracing::info!(r#"   {{"event":"login","data":"alice@example.com"}}"#);
    tracing::info!(r#"   {{"event":"subscribe","data":"GOOG"}}"#);

    // Serving without ticks is not useful: stop if the loop ever ends
    tokio::select! {
        served = axum::serve(listener, app).into_future() => served?,
        joined = broadcast_handle => {
            let reason = match joined {
                Ok(()) => "broadcast loop exited".to_string(),
                Err(e) => format!("broadcast loop failed: {}", e),
            };
            return Err(reason.into());
        }
    }
    Ok(())
}
