//! Book search gateway.
//!
//! Fans each search out to a randomly chosen catalog worker and to the
//! definition service, folds both answers into one `{books, definition}`
//! payload, and stores a list of favorite books.

pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{
    routing::{delete, get},
    Router,
};
use config::GatewayConfig;
use services::aggregator::SearchAggregator;
use services::favorites::FavoritesStore;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<SearchAggregator>,
    pub favorites: Arc<FavoritesStore>,
}

impl AppState {
    pub fn new(aggregator: SearchAggregator, favorites: FavoritesStore) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            favorites: Arc::new(favorites),
        }
    }

    /// The favorites store is created unconnected; it connects on first use.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            SearchAggregator::from_config(config),
            FavoritesStore::new(config.store.clone()),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(routes::health::health_check))
        .route("/healthz", get(routes::health::liveness))
        .route("/api/search", get(routes::search::search_books))
        .route(
            "/api/favorites",
            get(routes::favorites::list_favorites).post(routes::favorites::add_favorite),
        )
        .route("/api/favorites/:id", delete(routes::favorites::remove_favorite))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
