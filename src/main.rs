//! Aristosys API server.

use std::net::SocketAddr;

use aristosys::{api, config, AppState, Error, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aristosys=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (and .env) before the filter reads RUST_LOG
    let config = config::init();
    init_tracing();

    tracing::info!(
        environment = %config.server.environment,
        "Starting Aristosys server on {}:{}",
        config.server.host,
        config.server.port
    );

    for secret in config.missing_secrets() {
        tracing::warn!(secret, "Not configured; dependent features are disabled");
    }

    let state = AppState::new().await?;
    tracing::info!("Application state initialized");

    let app = api::app(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid listen address: {}", e)))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
