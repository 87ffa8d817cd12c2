use crate::Dictionary;
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct DefineParams {
    pub q: Option<String>,
}

/// `GET /define?q=`. Never fails: lookups that go wrong answer `[]`.
pub async fn define_word(
    Query(params): Query<DefineParams>,
    State(dictionary): State<Dictionary>,
) -> Json<Vec<String>> {
    let word = params.q.as_deref().map(str::trim).unwrap_or_default();
    if word.is_empty() {
        return Json(Vec::new());
    }

    match dictionary.define(word).await {
        Ok(definitions) => Json(definitions),
        Err(e) => {
            error!("Definition lookup for {:?} failed: {}", word, e);
            Json(Vec::new())
        }
    }
}
