use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    db::{StorageAdapter, StorageKey},
    error::{AppError, AppResult},
    models::{
        require_non_blank, Activity, DislikePolicy, ExportSnapshot, HistoryAction, HistoryEntry,
        Place, PlaceRecord, PreferencesBlob, PreferredActivity, Settings, SettingsPatch,
    },
    services::{
        history::HistoryLog,
        scoring::{self, Vote},
    },
};

/// Number of entries `history` callers get when they don't pick a limit
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// In-memory personalization state of one profile
struct StoreState {
    prefs: PreferencesBlob,
    history: HistoryLog,
    /// Set when the adapter failed to load; saves are skipped until a reload succeeds
    degraded: bool,
}

impl StoreState {
    fn category_score(&self, category: &str) -> i32 {
        self.prefs.activity_scores.get(category).copied().unwrap_or(0)
    }

    fn apply_category_vote(&mut self, category: &str, vote: Vote) -> i32 {
        let score = self
            .prefs
            .activity_scores
            .entry(category.to_string())
            .or_insert(0);
        *score = scoring::apply_vote(*score, vote);
        *score
    }

    fn apply_place_vote(&mut self, place: &Place, category: &str, vote: Vote) -> i32 {
        let record = self
            .prefs
            .place_scores
            .entry(place.place_id.clone())
            .or_insert_with(|| PlaceRecord::new(place, category));
        record.touch(place, category);
        record.score = record.score.saturating_add(vote.delta());
        record.score
    }

    fn liked_places_per_category(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for record in self.prefs.place_scores.values().filter(|r| r.is_liked()) {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    fn personalized_score(&self, category: &str) -> f64 {
        let liked = self
            .prefs
            .place_scores
            .values()
            .filter(|r| r.is_liked() && r.category == category)
            .count();
        scoring::personalized_score(self.category_score(category), liked)
    }
}

/// Personalization engine for a single profile
///
/// Owns activity scores, place records, settings and the interaction history.
/// Every public operation holds the state lock for its whole
/// read-modify-persist sequence, so concurrent callers never lose updates
/// and history order follows call order.
///
/// Storage failures are logged and swallowed, and every invariant (clamped
/// scores, capped history) keeps holding whether or not the last save went
/// through. A store whose load failed runs on defaults in memory and never
/// saves, so it cannot overwrite the profile it failed to read.
/// `reload_if_degraded` retries the load.
pub struct PreferenceStore {
    profile: String,
    storage: Arc<dyn StorageAdapter>,
    defaults: Settings,
    state: Mutex<StoreState>,
}

impl PreferenceStore {
    /// Loads a profile's state from storage
    ///
    /// Missing blobs start from defaults, with `defaults` as the settings of a
    /// brand new profile. Unparseable blobs are logged and replaced by the
    /// same defaults. An adapter error also starts from defaults but leaves
    /// the store degraded: nothing is saved until a reload succeeds.
    pub async fn open(
        profile: impl Into<String>,
        storage: Arc<dyn StorageAdapter>,
        defaults: Settings,
    ) -> Self {
        let profile = profile.into();
        let state = load_state(&profile, storage.as_ref(), &defaults).await;

        tracing::debug!(
            profile = %profile,
            adapter = storage.name(),
            categories = state.prefs.activity_scores.len(),
            places = state.prefs.place_scores.len(),
            history = state.history.len(),
            degraded = state.degraded,
            "Opened preference store"
        );

        Self {
            profile,
            storage,
            defaults,
            state: Mutex::new(state),
        }
    }

    /// Whether the last load hit an adapter error
    pub async fn is_degraded(&self) -> bool {
        self.state.lock().await.degraded
    }

    /// Retries the load of a degraded store; a healthy store is left alone
    ///
    /// On success the stored state replaces whatever was built up in memory
    /// meanwhile, since none of it was ever saved.
    pub async fn reload_if_degraded(&self) {
        let mut state = self.state.lock().await;
        if !state.degraded {
            return;
        }

        let reloaded = load_state(&self.profile, self.storage.as_ref(), &self.defaults).await;
        if reloaded.degraded {
            tracing::warn!(profile = %self.profile, "Storage still unavailable, profile stays unsaved");
            return;
        }

        *state = reloaded;
        tracing::info!(profile = %self.profile, "Reloaded profile after storage recovered");
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub async fn like_activity(&self, category: &str) -> AppResult<i32> {
        self.vote_activity(category, Vote::Like).await
    }

    pub async fn dislike_activity(&self, category: &str) -> AppResult<i32> {
        self.vote_activity(category, Vote::Dislike).await
    }

    async fn vote_activity(&self, category: &str, vote: Vote) -> AppResult<i32> {
        require_non_blank("category", category)?;

        let mut state = self.state.lock().await;
        let score = state.apply_category_vote(category, vote);
        self.persist_preferences(&state).await;

        tracing::debug!(profile = %self.profile, category = %category, ?vote, score, "Updated category score");
        Ok(score)
    }

    /// Raw category score; 0 for a category never voted on
    pub async fn activity_score(&self, category: &str) -> i32 {
        self.state.lock().await.category_score(category)
    }

    /// Records a place like: bumps the place, reinforces its category and logs a `like` entry
    pub async fn like_place(&self, place: &Place, category: &str) -> AppResult<()> {
        let place = place.validated()?;
        require_non_blank("category", category)?;

        let mut state = self.state.lock().await;
        let place_score = state.apply_place_vote(&place, category, Vote::Like);
        let category_score = state.apply_category_vote(category, Vote::Like);
        state
            .history
            .record(HistoryEntry::new(HistoryAction::Like, &place, category));
        self.persist_all(&state).await;

        tracing::info!(
            profile = %self.profile,
            place_id = %place.place_id,
            category = %category,
            place_score,
            category_score,
            "Recorded place like"
        );
        Ok(())
    }

    /// Records a place dislike according to the profile's `DislikePolicy`
    ///
    /// Under `LikeOnly` the call is validated and then ignored.
    pub async fn dislike_place(&self, place: &Place, category: &str) -> AppResult<()> {
        let place = place.validated()?;
        require_non_blank("category", category)?;

        let mut state = self.state.lock().await;
        let policy = state.prefs.settings.dislike_policy;
        match policy {
            DislikePolicy::LikeOnly => {
                tracing::debug!(
                    profile = %self.profile,
                    place_id = %place.place_id,
                    "Ignoring place dislike under like-only policy"
                );
            }
            DislikePolicy::Full => {
                let place_score = state.apply_place_vote(&place, category, Vote::Dislike);
                let category_score = state.apply_category_vote(category, Vote::Dislike);
                state
                    .history
                    .record(HistoryEntry::new(HistoryAction::Dislike, &place, category));
                self.persist_all(&state).await;

                tracing::info!(
                    profile = %self.profile,
                    place_id = %place.place_id,
                    category = %category,
                    place_score,
                    category_score,
                    "Recorded place dislike"
                );
            }
        }
        Ok(())
    }

    /// Logs a `visit` entry; scores are left alone
    pub async fn record_visit(&self, place: &Place, category: &str) -> AppResult<()> {
        let place = place.validated()?;
        require_non_blank("category", category)?;

        let mut state = self.state.lock().await;
        state
            .history
            .record(HistoryEntry::new(HistoryAction::Visit, &place, category));
        self.persist_history(&state).await;
        Ok(())
    }

    pub async fn is_place_liked(&self, place_id: &str) -> bool {
        self.state
            .lock()
            .await
            .prefs
            .place_scores
            .get(place_id)
            .is_some_and(PlaceRecord::is_liked)
    }

    /// Places with a positive score, best first
    pub async fn liked_places(&self) -> Vec<PlaceRecord> {
        let state = self.state.lock().await;
        let mut places: Vec<PlaceRecord> = state
            .prefs
            .place_scores
            .values()
            .filter(|r| r.score > 0)
            .cloned()
            .collect();
        places.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        places
    }

    /// Places with a negative score, most disliked first
    pub async fn disliked_places(&self) -> Vec<PlaceRecord> {
        let state = self.state.lock().await;
        let mut places: Vec<PlaceRecord> = state
            .prefs
            .place_scores
            .values()
            .filter(|r| r.score < 0)
            .cloned()
            .collect();
        places.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        places
    }

    /// Forgets a place record; returns whether one existed
    pub async fn remove_place(&self, place_id: &str) -> AppResult<bool> {
        require_non_blank("place_id", place_id)?;

        let mut state = self.state.lock().await;
        let removed = state.prefs.place_scores.remove(place_id).is_some();
        if removed {
            self.persist_preferences(&state).await;
            tracing::info!(profile = %self.profile, place_id = %place_id, "Removed place record");
        }
        Ok(removed)
    }

    /// Categories with a positive score, highest first
    pub async fn preferred_activities(&self) -> Vec<PreferredActivity> {
        let state = self.state.lock().await;
        let mut preferred: Vec<PreferredActivity> = state
            .prefs
            .activity_scores
            .iter()
            .filter(|(_, score)| **score > 0)
            .map(|(category, score)| PreferredActivity {
                category: category.clone(),
                score: *score,
            })
            .collect();
        // BTreeMap iteration is name-ordered and the sort is stable
        preferred.sort_by(|a, b| b.score.cmp(&a.score));
        preferred
    }

    /// Category score plus `PLACE_BOOST` per liked place in the category
    pub async fn personalized_score(&self, category: &str) -> f64 {
        self.state.lock().await.personalized_score(category)
    }

    /// Orders activities by descending personalized score
    ///
    /// Ties keep their input order. With personalization disabled the input
    /// comes back as is.
    pub async fn sort_activities(&self, activities: Vec<Activity>) -> Vec<Activity> {
        let state = self.state.lock().await;
        if !state.prefs.settings.enable_personalization {
            return activities;
        }

        let liked = state.liked_places_per_category();
        let mut scored: Vec<(f64, Activity)> = activities
            .into_iter()
            .map(|activity| {
                let name = activity.activity_name.as_str();
                let score = scoring::personalized_score(
                    state.category_score(name),
                    liked.get(name).copied().unwrap_or(0),
                );
                (score, activity)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().map(|(_, activity)| activity).collect()
    }

    /// Up to `limit` history entries, most recent first
    pub async fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.state.lock().await.history.recent(limit)
    }

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.prefs.settings.clone()
    }

    /// Shallow-merges `patch` into the current settings
    ///
    /// Lowering `maxHistoryItems` trims the history right away.
    pub async fn update_settings(&self, patch: SettingsPatch) -> AppResult<Settings> {
        let mut state = self.state.lock().await;
        let merged = state.prefs.settings.merged(&patch);
        merged.validate()?;

        let trimmed = merged.max_history_items < state.history.len();
        state.history.set_capacity(merged.max_history_items);
        state.prefs.settings = merged.clone();

        self.persist_preferences(&state).await;
        if trimmed {
            self.persist_history(&state).await;
        }

        tracing::info!(profile = %self.profile, settings = ?merged, "Updated settings");
        Ok(merged)
    }

    pub async fn clear_history(&self) {
        let mut state = self.state.lock().await;
        state.history.clear();
        self.persist_history(&state).await;
        tracing::info!(profile = %self.profile, "Cleared history");
    }

    /// Drops all category scores and place records; settings are kept
    pub async fn clear_preferences(&self) {
        let mut state = self.state.lock().await;
        state.prefs.activity_scores.clear();
        state.prefs.place_scores.clear();
        self.persist_preferences(&state).await;
        tracing::info!(profile = %self.profile, "Cleared preferences");
    }

    pub async fn export_data(&self) -> ExportSnapshot {
        let state = self.state.lock().await;
        ExportSnapshot {
            preferences: state.prefs.clone(),
            history: state.history.to_vec(),
            export_date: Utc::now(),
        }
    }

    /// Replaces state from a snapshot produced by `export_data`
    ///
    /// `preferences` and `history` are each optional but at least one must be
    /// present. Both are parsed and validated before anything is swapped in,
    /// so a `MalformedSnapshot` error leaves the current state untouched.
    pub async fn import_data(&self, snapshot: &Value) -> AppResult<()> {
        let object = snapshot.as_object().ok_or_else(|| {
            AppError::MalformedSnapshot("snapshot must be a JSON object".to_string())
        })?;

        let preferences = object
            .get("preferences")
            .map(parse_preferences)
            .transpose()?;
        let history = object.get("history").map(parse_history).transpose()?;

        if preferences.is_none() && history.is_none() {
            return Err(AppError::MalformedSnapshot(
                "snapshot carries neither preferences nor history".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if let Some(prefs) = preferences {
            state.history.set_capacity(prefs.settings.max_history_items);
            state.prefs = prefs;
        }
        if let Some(entries) = history {
            let capacity = state.prefs.settings.max_history_items;
            state.history = HistoryLog::from_entries(entries, capacity);
        }
        self.persist_all(&state).await;

        tracing::info!(
            profile = %self.profile,
            categories = state.prefs.activity_scores.len(),
            places = state.prefs.place_scores.len(),
            history = state.history.len(),
            "Imported snapshot"
        );
        Ok(())
    }

    async fn persist_all(&self, state: &StoreState) {
        self.persist_preferences(state).await;
        self.persist_history(state).await;
    }

    async fn persist_preferences(&self, state: &StoreState) {
        if self.skip_save(state) {
            return;
        }
        self.save_blob(StorageKey::Preferences(self.profile.clone()), &state.prefs)
            .await;
    }

    async fn persist_history(&self, state: &StoreState) {
        if self.skip_save(state) {
            return;
        }
        self.save_blob(StorageKey::History(self.profile.clone()), &state.history.to_vec())
            .await;
    }

    fn skip_save(&self, state: &StoreState) -> bool {
        if state.degraded {
            tracing::warn!(profile = %self.profile, "Skipping save, profile failed to load");
        }
        state.degraded
    }

    async fn save_blob<T: Serialize>(&self, key: StorageKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Preference serialization error");
                return;
            }
        };

        if let Err(e) = self.storage.save(&key, &json).await {
            tracing::error!(
                error = %e,
                key = %key,
                adapter = self.storage.name(),
                "Failed to persist blob, continuing with in-memory state"
            );
        }
    }
}

async fn load_state(
    profile: &str,
    storage: &dyn StorageAdapter,
    defaults: &Settings,
) -> StoreState {
    let prefs =
        load_blob::<PreferencesBlob>(storage, &StorageKey::Preferences(profile.to_string())).await;
    let entries =
        load_blob::<Vec<HistoryEntry>>(storage, &StorageKey::History(profile.to_string())).await;
    let degraded = prefs.is_err() || entries.is_err();

    let prefs = prefs
        .ok()
        .flatten()
        .map(|blob| sanitize_loaded(blob, defaults))
        .unwrap_or_else(|| PreferencesBlob {
            settings: defaults.clone(),
            ..Default::default()
        });
    let history = HistoryLog::from_entries(
        entries.ok().flatten().unwrap_or_default(),
        prefs.settings.max_history_items,
    );

    StoreState {
        prefs,
        history,
        degraded,
    }
}

/// `Ok(None)` for an absent or unparseable blob, `Err` only when the adapter failed
async fn load_blob<T: DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &StorageKey,
) -> AppResult<Option<T>> {
    match storage.load(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Stored blob is unparseable, using defaults");
                Ok(None)
            }
        },
        Ok(None) => Ok(None),
        Err(e) => {
            tracing::error!(
                error = %e,
                key = %key,
                adapter = storage.name(),
                "Failed to load blob, saves paused until it reloads"
            );
            Err(e)
        }
    }
}

/// Restores invariants on a blob read back from storage
fn sanitize_loaded(mut blob: PreferencesBlob, defaults: &Settings) -> PreferencesBlob {
    blob.activity_scores.retain(|category, _| !category.trim().is_empty());
    for score in blob.activity_scores.values_mut() {
        *score = scoring::clamp_score(*score);
    }
    blob.place_scores.retain(|place_id, _| !place_id.trim().is_empty());
    if blob.settings.validate().is_err() {
        tracing::warn!(settings = ?blob.settings, "Stored settings are invalid, using defaults");
        blob.settings = defaults.clone();
    }
    blob
}

fn parse_preferences(value: &Value) -> AppResult<PreferencesBlob> {
    let blob: PreferencesBlob = serde_json::from_value(value.clone())
        .map_err(|e| AppError::MalformedSnapshot(format!("preferences: {}", e)))?;

    for (category, score) in &blob.activity_scores {
        if category.trim().is_empty() {
            return Err(AppError::MalformedSnapshot(
                "preferences: blank activity category".to_string(),
            ));
        }
        if !scoring::in_range(*score) {
            return Err(AppError::MalformedSnapshot(format!(
                "preferences: score {} for '{}' is outside [{}, {}]",
                score,
                category,
                scoring::MIN_SCORE,
                scoring::MAX_SCORE
            )));
        }
    }

    for (place_id, record) in &blob.place_scores {
        if place_id.trim().is_empty() || *place_id != record.place_id {
            return Err(AppError::MalformedSnapshot(format!(
                "preferences: place key '{}' does not match its record",
                place_id
            )));
        }
    }

    blob.settings
        .validate()
        .map_err(|e| AppError::MalformedSnapshot(format!("preferences: {}", e)))?;

    Ok(blob)
}

fn parse_history(value: &Value) -> AppResult<Vec<HistoryEntry>> {
    let entries: Vec<HistoryEntry> = serde_json::from_value(value.clone())
        .map_err(|e| AppError::MalformedSnapshot(format!("history: {}", e)))?;

    if entries.iter().any(|e| e.place.place_id.trim().is_empty()) {
        return Err(AppError::MalformedSnapshot(
            "history: entry without a place id".to_string(),
        ));
    }
    Ok(entries)
}
