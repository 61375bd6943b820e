use async_trait::async_trait;
use redis::AsyncCommands;
use redis::Client;

use crate::db::{StorageAdapter, StorageKey};
use crate::error::AppResult;

/// Creates a Redis client for preference storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Preference storage backed by Redis string keys
#[derive(Clone)]
pub struct RedisStorage {
    redis_client: Client,
    /// Expiry applied on every save; `None` keeps blobs forever
    ttl: Option<u64>,
}

impl RedisStorage {
    pub fn new(redis_client: Client, ttl: Option<u64>) -> Self {
        Self { redis_client, ttl }
    }
}

#[async_trait]
impl StorageAdapter for RedisStorage {
    async fn load(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key.to_string()).await.map_err(|e| {
            tracing::warn!(error = %e, key = %key, "Redis get failed");
            e
        })?;
        Ok(value)
    }

    async fn save(&self, key: &StorageKey, value: &str) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        match self.ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key.to_string(), value, ttl).await?;
            }
            None => {
                let _: () = conn.set(key.to_string(), value).await?;
            }
        }
        tracing::debug!(key = %key, bytes = value.len(), "Stored blob in Redis");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
