use crate::config::GatewayConfig;
use crate::models::responses::{BookRecord, SearchResponse};
use crate::services::normalize::{normalize_books, normalize_definitions};
use crate::services::upstream::UpstreamClient;
use crate::services::workers::WorkerPool;
use crate::utils::url::endpoint_url;
use std::time::Duration;
use tracing::{info, warn};

/// Fans a search out to one catalog worker and the metadata service.
///
/// Both calls run concurrently and are awaited together, so a slow or
/// broken branch never holds up or poisons the other. A failed branch
/// contributes an empty list.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    upstream: UpstreamClient,
    workers: WorkerPool,
    meta_url: String,
    timeout: Duration,
    definition_limit: usize,
}

impl SearchAggregator {
    pub fn new(
        upstream: UpstreamClient,
        workers: WorkerPool,
        meta_url: &str,
        timeout: Duration,
        definition_limit: usize,
    ) -> Self {
        Self {
            upstream,
            workers,
            meta_url: meta_url.trim_end_matches('/').to_string(),
            timeout,
            definition_limit,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            UpstreamClient::new(),
            config.workers.clone(),
            &config.meta_url,
            config.upstream_timeout,
            config.definition_limit,
        )
    }

    /// `query` is expected to be trimmed and non-empty; the HTTP layer
    /// rejects anything else before we get here.
    pub async fn search(&self, query: &str) -> SearchResponse {
        let (books, definition) = tokio::join!(self.fetch_books(query), self.fetch_definitions(query));

        info!(
            "Search {:?}: {} books, {} definitions",
            query,
            books.len(),
            definition.len()
        );

        SearchResponse::new(books, definition)
    }

    async fn fetch_books(&self, query: &str) -> Vec<BookRecord> {
        let url = endpoint_url(self.workers.pick(), "search", query);

        match self.upstream.fetch_json(&url, self.timeout).await {
            Ok(raw) => normalize_books(raw),
            Err(e) => {
                warn!("Worker call {} failed ({}): {}", url, e.kind(), e);
                Vec::new()
            }
        }
    }

    async fn fetch_definitions(&self, query: &str) -> Vec<String> {
        let url = endpoint_url(&self.meta_url, "define", query);

        match self.upstream.fetch_json(&url, self.timeout).await {
            Ok(raw) => normalize_definitions(raw, self.definition_limit),
            Err(e) => {
                warn!("Metadata call {} failed ({}): {}", url, e.kind(), e);
                Vec::new()
            }
        }
    }
}
