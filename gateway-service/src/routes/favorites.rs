use crate::models::favorites::{FavoriteDoc, NewFavorite};
use crate::models::responses::{DeleteResponse, ErrorResponse};
use crate::services::favorites::FavoritesError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

impl IntoResponse for FavoritesError {
    fn into_response(self) -> Response {
        let status = match &self {
            FavoritesError::Validation(_) | FavoritesError::InvalidIdFormat(_) => StatusCode::BAD_REQUEST,
            FavoritesError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FavoritesError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Favorites request failed: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<Vec<FavoriteDoc>>, FavoritesError> {
    Ok(Json(state.favorites.list().await?))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    body: Result<Json<NewFavorite>, JsonRejection>,
) -> Result<(StatusCode, Json<FavoriteDoc>), FavoritesError> {
    let Json(favorite) = body.map_err(|rejection| {
        FavoritesError::Validation(format!("invalid favorite body: {}", rejection.body_text()))
    })?;

    let doc = state.favorites.add(favorite).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn remove_favorite(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, FavoritesError> {
    Ok(Json(state.favorites.remove(&id).await?))
}
