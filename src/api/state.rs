use std::sync::Arc;

use crate::{
    db::{MemoryStorage, StorageAdapter},
    models::Settings,
    services::{registry::DEFAULT_MAX_OPEN_PROFILES, PreferenceSync, ProfileRegistry},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProfileRegistry>,
    /// Backend that mirrors place votes, if configured
    pub sync: Option<Arc<dyn PreferenceSync>>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        defaults: Settings,
        max_open_profiles: usize,
    ) -> Self {
        Self {
            registry: Arc::new(
                ProfileRegistry::new(storage, defaults).with_max_open_profiles(max_open_profiles),
            ),
            sync: None,
        }
    }

    /// In-memory state with default settings
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Settings::default(),
            DEFAULT_MAX_OPEN_PROFILES,
        )
    }

    pub fn with_sync(mut self, sync: Arc<dyn PreferenceSync>) -> Self {
        self.sync = Some(sync);
        self
    }
}
