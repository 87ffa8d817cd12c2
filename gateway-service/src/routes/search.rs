use crate::models::responses::{ErrorResponse, SearchResponse};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

pub const FALLBACK_WARNING: &str = "gateway-fallback";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `GET /api/search?q=`
///
/// A blank or unparseable query string is a malformed request and gets a
/// JSON 400. Everything past
/// that point answers 200: upstream failures already degrade to empty
/// lists inside the aggregator, and a panic during aggregation is caught
/// here and turned into an empty result carrying a warning.
pub async fn search_books(
    params: Result<Query<SearchParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Query(params) = params.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid query string: {}", rejection.body_text()),
            }),
        )
    })?;

    let query = params.q.as_deref().map(str::trim).unwrap_or_default().to_string();

    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "query parameter 'q' is required".to_string(),
            }),
        ));
    }

    info!("Search query: {:?}", query);

    let aggregator = Arc::clone(&state.aggregator);
    let task_query = query.clone();
    let result = match tokio::spawn(async move { aggregator.search(&task_query).await }).await {
        Ok(result) => result,
        Err(e) => {
            error!("Search aggregation for {:?} aborted: {}", query, e);
            SearchResponse::fallback(FALLBACK_WARNING)
        }
    };

    Ok(Json(result))
}
