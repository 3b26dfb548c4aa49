use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use tokio::sync::RwLock;

use crate::errors::Result;

/// Durable string key/value storage. Values are JSON documents owned by the
/// caller; the store never inspects them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    fn backend(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

pub fn predictions_key(user_id: &str) -> String {
    format!("predictions-{}", user_id)
}

pub fn user_key(user_id: &str) -> String {
    format!("user-{}", user_id)
}

pub fn user_email_key(email: &str) -> String {
    format!("user-email-{}", email.to_lowercase())
}

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        tracing::info!("✅ Connected to Redis");
        Ok(RedisStore { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        let mut iter: redis::AsyncIter<String> = conn.scan_match(format!("{}*", prefix)).await?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Process-local store used when no Redis URL is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        MemoryStore {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub async fn connect_store(redis_url: Option<&str>) -> SharedStore {
    match redis_url {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("❌ Failed to connect to Redis: {}", e);
                tracing::warn!("Predictions will be kept in memory only");
                Arc::new(MemoryStore::new())
            }
        },
        None => {
            tracing::warn!("REDIS_URL not set, predictions will be kept in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}
