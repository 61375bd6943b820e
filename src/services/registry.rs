use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::{
    db::StorageAdapter,
    error::{AppError, AppResult},
    models::Settings,
    services::preferences::PreferenceStore,
};

const MAX_PROFILE_LEN: usize = 64;

/// Open profiles kept when `MAX_OPEN_PROFILES` is not configured
pub const DEFAULT_MAX_OPEN_PROFILES: usize = 1000;

/// One profile's place in the registry
///
/// The store is opened once through the cell, outside the map lock, so a
/// slow load only holds up requests for the same profile.
struct Slot {
    store: OnceCell<Arc<PreferenceStore>>,
    last_used: AtomicU64,
}

impl Slot {
    fn new(tick: u64) -> Self {
        Self {
            store: OnceCell::new(),
            last_used: AtomicU64::new(tick),
        }
    }
}

/// Holds one `PreferenceStore` per profile, loading each on first use
///
/// At most `max_open` profiles stay open. Past that, the least recently used
/// idle profiles are dropped and reload from storage on their next request.
/// A profile some request still holds is never dropped, so two stores for
/// the same profile can't be live at once.
pub struct ProfileRegistry {
    storage: Arc<dyn StorageAdapter>,
    defaults: Settings,
    max_open: usize,
    clock: AtomicU64,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl ProfileRegistry {
    pub fn new(storage: Arc<dyn StorageAdapter>, defaults: Settings) -> Self {
        Self {
            storage,
            defaults,
            max_open: DEFAULT_MAX_OPEN_PROFILES,
            clock: AtomicU64::new(0),
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_max_open_profiles(mut self, max_open: usize) -> Self {
        self.max_open = max_open.max(1);
        self
    }

    /// Returns the store for `profile`, opening it from storage if needed
    ///
    /// A store whose earlier load failed retries it here.
    pub async fn store(&self, profile: &str) -> AppResult<Arc<PreferenceStore>> {
        validate_profile(profile)?;

        let slot = self.slot(profile).await;
        let store = slot
            .store
            .get_or_init(|| async {
                let store =
                    PreferenceStore::open(profile, self.storage.clone(), self.defaults.clone())
                        .await;
                tracing::info!(profile = %profile, "Opened profile");
                Arc::new(store)
            })
            .await
            .clone();

        store.reload_if_degraded().await;
        Ok(store)
    }

    pub async fn open_profiles(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn slot(&self, profile: &str) -> Arc<Slot> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);

        if let Some(slot) = self.slots.read().await.get(profile) {
            slot.last_used.store(tick, Ordering::Relaxed);
            return slot.clone();
        }

        let mut slots = self.slots.write().await;
        // Another request may have added it while we waited for the write lock
        if let Some(slot) = slots.get(profile) {
            slot.last_used.store(tick, Ordering::Relaxed);
            return slot.clone();
        }

        if slots.len() >= self.max_open {
            let excess = slots.len() + 1 - self.max_open;
            let evicted = evict_idle(&mut slots, excess);
            if evicted < excess {
                tracing::warn!(
                    open_profiles = slots.len(),
                    max_open = self.max_open,
                    "All open profiles are busy, going over the limit"
                );
            }
        }

        let slot = Arc::new(Slot::new(tick));
        slots.insert(profile.to_string(), slot.clone());
        slot
    }
}

/// Nothing outside the map holds the slot or its store
fn is_idle(slot: &Arc<Slot>) -> bool {
    Arc::strong_count(slot) == 1
        && slot
            .store
            .get()
            .map_or(true, |store| Arc::strong_count(store) == 1)
}

/// Drops up to `count` idle slots, least recently used first
fn evict_idle(slots: &mut HashMap<String, Arc<Slot>>, count: usize) -> usize {
    let mut idle: Vec<(u64, String)> = slots
        .iter()
        .filter(|(_, slot)| is_idle(slot))
        .map(|(profile, slot)| (slot.last_used.load(Ordering::Relaxed), profile.clone()))
        .collect();
    idle.sort_unstable();

    let mut evicted = 0;
    for (_, profile) in idle.into_iter().take(count) {
        slots.remove(&profile);
        tracing::debug!(profile = %profile, "Closed idle profile");
        evicted += 1;
    }
    evicted
}

fn validate_profile(profile: &str) -> AppResult<()> {
    if profile.is_empty() || profile.len() > MAX_PROFILE_LEN {
        return Err(AppError::InvalidInput(format!(
            "profile must be 1-{} characters",
            MAX_PROFILE_LEN
        )));
    }
    if !profile
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::InvalidInput(
            "profile may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}
