use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved favorite as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDoc {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Client payload for `POST /api/favorites`. `title` is optional here so a
/// missing title is reported as a validation error instead of a JSON
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFavorite {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl NewFavorite {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }
}
