use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod models;
mod routes;
mod services;
mod utils;

use routes::{
    define::define_word,
    health::{health_check, liveness},
};
use services::dictionary::{DictionaryClient, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_TIMEOUT};
use utils::env::env_or;

type Dictionary = Arc<DictionaryClient>;

fn build_router(dictionary: Dictionary) -> Router {
    Router::new()
        .route("/status", get(health_check))
        .route("/healthz", get(liveness))
        .route("/define", get(define_word))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(dictionary)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meta_service=info,tower_http=info")),
        )
        .init();

    let base_url: String = env_or("DICTIONARY_URL", DEFAULT_BASE_URL.to_string());
    let limit = env_or("DEFINITION_LIMIT", DEFAULT_LIMIT);
    let timeout = Duration::from_millis(env_or("UPSTREAM_TIMEOUT_MS", DEFAULT_TIMEOUT.as_millis() as u64));

    info!("Dictionary source {} (limit {})", base_url, limit);
    let dictionary: Dictionary = Arc::new(DictionaryClient::new(&base_url, limit, timeout));

    let port: u16 = env_or("PORT", 3001);
    let addr = format!("0.0.0.0:{}", port);

    info!("Meta service starting on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    serve_until(listener, build_router(dictionary), shutdown_signal()).await?;

    info!("Meta service stopped");
    Ok(())
}

/// Serves until `shutdown` resolves, then lets in-flight requests finish.
async fn serve_until<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
