//! Poultry Ledger - Backend Server entry point

use std::sync::Arc;

use ledger_server::{create_app, store, AppState, Config, LedgerService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ledger_server=debug,tower_http=debug,sqlx=warn".into());
    if std::env::var_os("LEDGER_LOG_JSON").is_some() {
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

    // Load configuration
    let config = Config::load()?;

    tracing::info!("Starting Poultry Ledger Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Storage backend: {}", config.storage.backend);

    let store = store::build_store(&config).await?;
    let ledger = LedgerService::new(store);

    // Warm the snapshot; an unreachable store is reported, not fatal
    match ledger.refresh().await {
        Ok(snapshot) => tracing::info!("Loaded {} records", snapshot.counts().total()),
        Err(e) => tracing::warn!("Initial load failed: {}", e),
    }

    // Create application state
    let state = AppState {
        ledger: Arc::new(ledger),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
