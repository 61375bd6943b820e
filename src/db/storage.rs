use std::fmt::Display;

use async_trait::async_trait;

use crate::error::AppResult;

/// The two independent blobs kept per profile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Preferences(String),
    History(String),
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::Preferences(profile) => write!(f, "navix:prefs:{}", profile),
            StorageKey::History(profile) => write!(f, "navix:history:{}", profile),
        }
    }
}

/// Durable key-value storage for preference blobs
///
/// Values are opaque JSON strings. `load` yields `None` for a key that was
/// never written; callers decide what the default structure is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn load(&self, key: &StorageKey) -> AppResult<Option<String>>;

    async fn save(&self, key: &StorageKey, value: &str) -> AppResult<()>;

    /// Adapter name for logging
    fn name(&self) -> &'static str;
}
