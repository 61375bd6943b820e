use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StorageAdapter, StorageKey};
use crate::error::AppResult;

/// Process-local storage, used when no Redis URL is configured and in tests
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value, bypassing serialization
    pub async fn insert_raw(&self, key: &StorageKey, value: impl Into<String>) {
        self.entries.write().await.insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn load(&self, key: &StorageKey) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn save(&self, key: &StorageKey, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
