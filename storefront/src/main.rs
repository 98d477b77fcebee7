use dotenvy::dotenv;
use std::time::Duration;
use storefront::config::get_configuration;
use storefront::shell::Storefront;
use storefront::startup::build_router;
use storefront::AppState;
use storefront_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "storefront",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    storefront::services::metrics::init_metrics()?;

    let state = AppState::new(Storefront::connect(&configuration)?);

    // Notices disappear on their own once their TTL passes
    let expiry = state.storefront.clone();
    let sweep_every = (configuration.presentation.notice_ttl() / 5).max(Duration::from_millis(200));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            expiry.expire_notices().await;
        }
    });

    // Initial load; a failure is already a notice on the inventory view
    if let Err(e) = state.storefront.inventory.refresh().await {
        tracing::warn!(error = %e, "Initial inventory load failed");
    }

    let app = build_router(state.clone());

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting storefront on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    state.storefront.dispose().await;
    info!("Storefront stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
