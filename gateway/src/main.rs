//! Custodia Gateway Binary
//!
//! HTTP facade over the custodial balance ledger.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use custodia_gateway::routes::{router, AppState};
use custodia_gateway::{ApiKeyDirectory, GatewayConfig, Metrics};
use custodia_ledger::{DeadlineSink, EventJournal, ImmediateSettlement, Ledger, TransferSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Custodia Gateway");

    // Load configuration
    let config = GatewayConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let sink = build_sink(config.transfer_timeout);
    let journal = Arc::new(EventJournal::new());
    let ledger = Ledger::new(config.owner.clone(), sink, journal)
        .map_err(|e| anyhow::anyhow!("Ledger construction failed: {}", e))?;

    let state = Arc::new(AppState {
        ledger: Arc::new(ledger),
        keys: Arc::new(ApiKeyDirectory::new(config.api_keys.clone())),
        metrics: Arc::new(Metrics::new()),
    });

    // Crude backpressure: bound in-flight requests across the whole facade.
    let app = router(state).layer(tower::limit::ConcurrencyLimitLayer::new(
        config.max_in_flight,
    ));

    let bind = format!("{}:{}", config.listen_addr, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&bind).await?;

    info!(
        owner = %config.owner,
        listen = %bind,
        "Gateway running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway shutdown complete");
    Ok(())
}

fn build_sink(timeout: Option<Duration>) -> Arc<dyn TransferSink> {
    let inner = Arc::new(ImmediateSettlement);
    match timeout {
        Some(deadline) => Arc::new(DeadlineSink::new(inner, deadline)),
        None => inner,
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
