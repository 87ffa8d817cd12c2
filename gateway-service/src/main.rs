use gateway_service::config::GatewayConfig;
use gateway_service::{build_router, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gateway_service=info,tower_http=info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    info!("Catalog workers: {:?}", config.workers.endpoints());
    info!("Metadata service: {}", config.meta_url);
    info!(
        "Upstream timeout {:?}, definition limit {}",
        config.upstream_timeout, config.definition_limit
    );

    let app = build_router(AppState::from_config(&config));

    let addr = config.bind_addr();
    info!("Gateway service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
