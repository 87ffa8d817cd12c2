use crate::models::favorites::FavoriteDoc;
use async_trait::async_trait;
use redis::AsyncCommands;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

const FAVORITE_KEY_PREFIX: &str = "favorite:";
const CREATED_AT_INDEX: &str = "favorites:by_created_at";
const INSERT_SEQUENCE: &str = "favorites:seq";
const SEQUENCE_SLOTS: i64 = 1000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Which document store backs the favorites collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Redis { url: String },
    Postgres { url: String },
    Memory,
}

#[async_trait]
pub trait FavoritesBackend {
    async fn insert(&self, doc: &FavoriteDoc) -> Result<(), StorageError>;
    async fn list_newest_first(&self) -> Result<Vec<FavoriteDoc>, StorageError>;
    /// Returns `true` when exactly one document was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StorageError>;
    async fn test_connection(&self) -> Result<(), StorageError>;
}

pub type Backend = Arc<dyn FavoritesBackend + Send + Sync>;

/// Opens a connection to the configured store and makes sure the
/// `createdAt` ordering index exists.
pub async fn connect_backend(settings: &StoreSettings) -> Result<Backend, StorageError> {
    let backend: Backend = match settings {
        StoreSettings::Redis { url } => {
            info!("Connecting to Redis favorites store");
            Arc::new(RedisBackend::connect(url).await?)
        }
        StoreSettings::Postgres { url } => {
            info!("Connecting to PostgreSQL favorites store");
            Arc::new(PostgresBackend::connect(url).await?)
        }
        StoreSettings::Memory => {
            info!("Using in-memory favorites store");
            Arc::new(MemoryBackend::default())
        }
    };

    backend.test_connection().await?;
    Ok(backend)
}

fn favorite_key(id: Uuid) -> String {
    format!("{}{}", FAVORITE_KEY_PREFIX, id)
}

/// Sorted-set score for a favorite: creation millis with the insert
/// sequence folded into the low digits, so documents created in the same
/// millisecond still rank newest insert first.
fn index_score(created_at_millis: i64, sequence: i64) -> i64 {
    created_at_millis * SEQUENCE_SLOTS + sequence.rem_euclid(SEQUENCE_SLOTS)
}

pub struct RedisBackend {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisBackend {
    pub async fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                StorageError::Connection(format!("timed out connecting to {}", redis_url))
            })??;

        // The sorted set is created implicitly on first ZADD, so there is no
        // separate index setup step for Redis.
        Ok(Self { conn })
    }
}

#[async_trait]
impl FavoritesBackend for RedisBackend {
    async fn insert(&self, doc: &FavoriteDoc) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();

        let value = serde_json::to_string(doc)?;
        let sequence: i64 = conn.incr(INSERT_SEQUENCE, 1).await?;
        let score = index_score(doc.created_at.timestamp_millis(), sequence);

        redis::pipe()
            .atomic()
            .set(favorite_key(doc.id), value)
            .ignore()
            .zadd(CREATED_AT_INDEX, doc.id.to_string(), score)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<FavoriteDoc>, StorageError> {
        let mut conn = self.conn.clone();

        let ids: Vec<String> = conn.zrevrange(CREATED_AT_INDEX, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| format!("{}{}", FAVORITE_KEY_PREFIX, id))
            .collect();
        let values: Vec<Option<String>> = conn.mget(&keys).await?;

        let mut docs = Vec::with_capacity(values.len());
        for json_str in values.into_iter().flatten() {
            docs.push(serde_json::from_str(&json_str)?);
        }

        Ok(docs)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut conn = self.conn.clone();

        let (removed, _): (i64, i64) = redis::pipe()
            .atomic()
            .del(favorite_key(id))
            .zrem(CREATED_AT_INDEX, id.to_string())
            .query_async(&mut conn)
            .await?;

        Ok(removed == 1)
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                seq BIGSERIAL,
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT,
                year INTEGER,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        // Tables created before the insert sequence existed.
        sqlx::query("ALTER TABLE favorites ADD COLUMN IF NOT EXISTS seq BIGSERIAL")
            .execute(&pool)
            .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_favorites_created_at ON favorites(created_at DESC, seq DESC)
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl FavoritesBackend for PostgresBackend {
    async fn insert(&self, doc: &FavoriteDoc) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO favorites (id, title, author, year, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(doc.id)
        .bind(&doc.title)
        .bind(&doc.author)
        .bind(doc.year)
        .bind(doc.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<FavoriteDoc>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, title, author, year, created_at FROM favorites ORDER BY created_at DESC, seq DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let docs = rows
            .into_iter()
            .map(|row| FavoriteDoc {
                id: row.get("id"),
                title: row.get("title"),
                author: row.get("author"),
                year: row.get("year"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(docs)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

/// Keeps favorites in process memory. Used for tests and local runs
/// without a database.
#[derive(Default)]
pub struct MemoryBackend {
    docs: RwLock<Vec<FavoriteDoc>>,
}

#[async_trait]
impl FavoritesBackend for MemoryBackend {
    async fn insert(&self, doc: &FavoriteDoc) -> Result<(), StorageError> {
        self.docs.write().await.push(doc.clone());
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<FavoriteDoc>, StorageError> {
        // Reverse insertion order first so that documents sharing a
        // timestamp still come out newest first after the stable sort.
        let mut docs: Vec<FavoriteDoc> = self.docs.read().await.iter().rev().cloned().collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(before - docs.len() == 1)
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn doc(title: &str, minutes_ago: i64) -> FavoriteDoc {
        FavoriteDoc {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: None,
            year: None,
            created_at: Utc::now() - ChronoDuration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_memory_backend_orders_newest_first() {
        let backend = MemoryBackend::default();
        backend.insert(&doc("old", 10)).await.unwrap();
        backend.insert(&doc("newest", 0)).await.unwrap();
        backend.insert(&doc("middle", 5)).await.unwrap();

        let titles: Vec<String> = backend
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();

        assert_eq!(titles, vec!["newest", "middle", "old"]);
    }

    #[tokio::test]
    async fn test_memory_backend_same_timestamp_keeps_latest_insert_first() {
        let backend = MemoryBackend::default();
        let first = doc("first", 0);
        let mut second = doc("second", 0);
        second.created_at = first.created_at;

        backend.insert(&first).await.unwrap();
        backend.insert(&second).await.unwrap();

        let docs = backend.list_newest_first().await.unwrap();
        assert_eq!(docs[0].title, "second");
        assert_eq!(docs[1].title, "first");
    }

    #[tokio::test]
    async fn test_memory_backend_delete_reports_match() {
        let backend = MemoryBackend::default();
        let kept = doc("kept", 1);
        let gone = doc("gone", 0);
        backend.insert(&kept).await.unwrap();
        backend.insert(&gone).await.unwrap();

        assert!(backend.delete(gone.id).await.unwrap());
        assert!(!backend.delete(gone.id).await.unwrap());
        assert!(!backend.delete(Uuid::new_v4()).await.unwrap());

        let remaining = backend.list_newest_first().await.unwrap();
        assert_eq!(remaining, vec![kept]);
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let backend = connect_backend(&StoreSettings::Memory).await.unwrap();
        assert!(backend.list_newest_first().await.unwrap().is_empty());
    }

    #[test]
    fn test_index_score_breaks_ties_by_insert_sequence() {
        let millis = Utc::now().timestamp_millis();

        assert!(index_score(millis, 8) > index_score(millis, 7));
        assert!(index_score(millis + 1, 1) > index_score(millis, 999));
        // Sequence wraps inside the slot, never spilling into the next millisecond.
        assert!(index_score(millis, 1999) < index_score(millis + 1, 0));
        // Redis scores are doubles; stay in the exactly representable range.
        assert!(index_score(millis, 999) < (1_i64 << 53));
    }

    /// Shared contract for the external stores: newest first with ties
    /// resolved by insert order, and delete reporting whether it matched.
    async fn check_backend_contract(backend: Backend) {
        let older = doc("older", 3);
        let first = doc("same-ms-first", 0);
        let mut second = doc("same-ms-second", 0);
        second.created_at = first.created_at;

        backend.insert(&older).await.unwrap();
        backend.insert(&first).await.unwrap();
        backend.insert(&second).await.unwrap();

        let ids: Vec<Uuid> = backend
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .filter(|id| [older.id, first.id, second.id].contains(id))
            .collect();
        assert_eq!(ids, vec![second.id, first.id, older.id]);

        for id in [older.id, first.id, second.id] {
            assert!(backend.delete(id).await.unwrap());
            assert!(!backend.delete(id).await.unwrap());
        }
        assert!(!backend.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis; set REDIS_URL"]
    async fn test_redis_backend_contract() {
        let url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
        let backend = connect_backend(&StoreSettings::Redis { url }).await.unwrap();
        check_backend_contract(backend).await;
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL; set DATABASE_URL"]
    async fn test_postgres_backend_contract() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let backend = connect_backend(&StoreSettings::Postgres { url }).await.unwrap();
        check_backend_contract(backend).await;
    }
}
