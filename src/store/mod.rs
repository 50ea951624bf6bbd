use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::StoreError;

pub const USER_VOTES_KEY: &str = "campaign_user_votes";
pub const LAST_VOTE_TIME_KEY: &str = "campaign_last_vote";

// Durable key/value storage of JSON-encoded strings.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let in_memory = db_url.contains(":memory:");

        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating preference database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // Each connection to an in-memory database is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM preferences")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}

/// JSON view over a [`PreferenceStore`]. Reads fall back to a default and
/// writes report a bool, so storage trouble never reaches the caller.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    // Serializes read-modify-write cycles between clones.
    update_lock: Arc<AsyncMutex<()>>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            update_lock: Arc::new(AsyncMutex::new(())),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return default,
            Err(e) => {
                warn!("Failed to read preference '{}': {}", key, e);
                return default;
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding malformed preference '{}': {}", key, e);
            default
        })
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode preference '{}': {}", key, e);
                return false;
            }
        };

        match self.store.set(key, &encoded).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write preference '{}': {}", key, e);
                false
            }
        }
    }

    /// Reads `key` (or `default`), lets `apply` change it and writes it back.
    /// Every clone of this handle waits for the others, so concurrent updates
    /// to the same key are not lost. Returns the written value on success.
    pub async fn update<T, F>(&self, key: &str, default: T, apply: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let _guard = self.update_lock.lock().await;

        let mut value = self.get(key, default).await;
        apply(&mut value);
        self.set(key, &value).await.then_some(value)
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!("Failed to remove preference '{}': {}", key, e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear preferences: {}", e);
        }
    }
}
