use crate::models::favorites::{FavoriteDoc, NewFavorite};
use crate::models::responses::DeleteResponse;
use crate::models::storage::{connect_backend, Backend, StorageError, StoreSettings};
use chrono::{SubsecRound, Utc};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{error, info};
use uuid::Uuid;

const HYPHENATED_UUID_LEN: usize = 36;

#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid favorite id: {0:?}")]
    InvalidIdFormat(String),
    #[error("favorites store unavailable: {0}")]
    StoreUnavailable(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The favorites collection.
///
/// No connection is opened until the first operation needs one. Concurrent
/// first requests share a single initialization; if it fails nothing is
/// cached and the next request tries again.
pub struct FavoritesStore {
    settings: StoreSettings,
    backend: OnceCell<Backend>,
}

impl FavoritesStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            backend: OnceCell::new(),
        }
    }

    /// Wraps an already connected backend.
    pub fn with_backend(backend: Backend) -> Self {
        Self {
            settings: StoreSettings::Memory,
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.backend.initialized()
    }

    async fn backend(&self) -> Result<&Backend, FavoritesError> {
        self.backend
            .get_or_try_init(|| async {
                let backend = connect_backend(&self.settings).await.map_err(|e| {
                    error!("Failed to initialize favorites store: {}", e);
                    FavoritesError::StoreUnavailable(e.to_string())
                })?;
                info!("Favorites store ready");
                Ok::<_, FavoritesError>(backend)
            })
            .await
    }

    pub async fn list(&self) -> Result<Vec<FavoriteDoc>, FavoritesError> {
        let docs = self.backend().await?.list_newest_first().await?;
        Ok(docs)
    }

    pub async fn add(&self, favorite: NewFavorite) -> Result<FavoriteDoc, FavoritesError> {
        let title = favorite
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| FavoritesError::Validation("title required".to_string()))?
            .to_string();

        let author = favorite.author.filter(|author| !author.trim().is_empty());

        let doc = FavoriteDoc {
            id: Uuid::new_v4(),
            title,
            author,
            year: favorite.year,
            // Millisecond precision is what every backend can store losslessly.
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.backend().await?.insert(&doc).await?;
        info!("Saved favorite {} ({})", doc.id, doc.title);

        Ok(doc)
    }

    pub async fn remove(&self, id: &str) -> Result<DeleteResponse, FavoritesError> {
        let id = parse_favorite_id(id)?;
        let deleted = self.backend().await?.delete(id).await?;

        if deleted {
            info!("Removed favorite {}", id);
        }

        Ok(DeleteResponse { deleted })
    }
}

/// Favorite ids are hyphenated UUIDs; anything else is rejected before the
/// store is consulted.
pub fn parse_favorite_id(raw: &str) -> Result<Uuid, FavoritesError> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return Err(FavoritesError::InvalidIdFormat(raw.to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| FavoritesError::InvalidIdFormat(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::storage::MemoryBackend;
    use std::sync::Arc;

    fn memory_store() -> FavoritesStore {
        FavoritesStore::new(StoreSettings::Memory)
    }

    fn unreachable_store() -> FavoritesStore {
        FavoritesStore::new(StoreSettings::Redis {
            url: "redis://127.0.0.1:1".to_string(),
        })
    }

    #[tokio::test]
    async fn test_add_requires_title() {
        let store = memory_store();

        for favorite in [
            NewFavorite::default(),
            NewFavorite::titled(""),
            NewFavorite::titled("   "),
        ] {
            let err = store.add(favorite).await.unwrap_err();
            assert!(matches!(err, FavoritesError::Validation(_)));
        }
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamp() {
        let store = memory_store();
        let before = Utc::now().trunc_subsecs(3);

        let doc = store
            .add(NewFavorite {
                title: Some("  Anna Karenina ".to_string()),
                author: Some("Leo Tolstoy".to_string()),
                year: Some(1878),
            })
            .await
            .unwrap();

        assert_eq!(doc.title, "Anna Karenina");
        assert_eq!(doc.author.as_deref(), Some("Leo Tolstoy"));
        assert_eq!(doc.year, Some(1878));
        assert!(doc.created_at >= before);
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn test_added_doc_is_listed_first_and_removable() {
        let store = memory_store();
        store.add(NewFavorite::titled("Older")).await.unwrap();
        let doc = store.add(NewFavorite::titled("Newer")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0], doc);
        assert_eq!(listed.len(), 2);

        let response = store.remove(&doc.id.to_string()).await.unwrap();
        assert!(response.deleted);

        let listed = store.list().await.unwrap();
        assert!(listed.iter().all(|d| d.id != doc.id));
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_not_an_error() {
        let store = memory_store();

        let response = store.remove(&Uuid::new_v4().to_string()).await.unwrap();
        assert!(!response.deleted);
    }

    #[tokio::test]
    async fn test_remove_malformed_id_never_touches_store() {
        let store = unreachable_store();

        for id in ["", "123", "not-a-uuid", "0123456789abcdef01234567", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            let err = store.remove(id).await.unwrap_err();
            assert!(matches!(err, FavoritesError::InvalidIdFormat(_)), "id {:?}", id);
        }
        assert!(!store.is_connected());
    }

    #[test]
    fn test_parse_favorite_id_only_accepts_hyphenated() {
        let id = Uuid::new_v4();

        assert_eq!(parse_favorite_id(&id.to_string()).unwrap(), id);
        assert!(parse_favorite_id(&id.simple().to_string()).is_err());
        assert!(parse_favorite_id(&format!("{{{}}}", id)).is_err());
    }

    #[tokio::test]
    async fn test_unavailable_store_is_reported_and_retried() {
        let store = unreachable_store();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, FavoritesError::StoreUnavailable(_)));
        assert!(!store.is_connected());

        let err = store.add(NewFavorite::titled("Retry")).await.unwrap_err();
        assert!(matches!(err, FavoritesError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let store = Arc::new(memory_store());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add(NewFavorite::titled(&format!("Book {}", i))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Had racing requests each opened their own backend, the documents
        // would be scattered across them.
        assert_eq!(store.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_with_backend_is_already_connected() {
        let store = FavoritesStore::with_backend(Arc::new(MemoryBackend::default()));

        assert!(store.is_connected());
        assert!(store.list().await.unwrap().is_empty());
    }
}
