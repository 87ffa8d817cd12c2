use crate::models::responses::BookResult;
use crate::Catalog;
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `GET /search?q=`. Always answers with a JSON array; upstream trouble
/// yields an empty one.
pub async fn search_books(
    Query(params): Query<SearchParams>,
    State(catalog): State<Catalog>,
) -> Json<Vec<BookResult>> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Json(Vec::new());
    }

    match catalog.search(query).await {
        Ok(books) => {
            info!("Found {} books for {:?}", books.len(), query);
            Json(books)
        }
        Err(e) => {
            error!("Worker search for {:?} failed: {}", query, e);
            Json(Vec::new())
        }
    }
}
