use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 100;

/// How `dislike_place` treats a place-level dislike
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DislikePolicy {
    /// Place dislikes are accepted and ignored; only likes are recorded
    #[default]
    LikeOnly,
    /// Place dislikes decrement the place and category scores and are recorded in history
    Full,
}

/// Per-profile personalization settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether preference scores affect activity ordering
    #[serde(default = "default_enable_personalization")]
    pub enable_personalization: bool,
    /// Maximum number of history entries kept
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,
    #[serde(default)]
    pub dislike_policy: DislikePolicy,
}

fn default_enable_personalization() -> bool {
    true
}

fn default_max_history_items() -> usize {
    DEFAULT_MAX_HISTORY_ITEMS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_personalization: default_enable_personalization(),
            max_history_items: default_max_history_items(),
            dislike_policy: DislikePolicy::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> AppResult<()> {
        if self.max_history_items == 0 {
            return Err(AppError::InvalidInput(
                "maxHistoryItems must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with every field present in `patch` overwritten
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            enable_personalization: patch
                .enable_personalization
                .unwrap_or(self.enable_personalization),
            max_history_items: patch.max_history_items.unwrap_or(self.max_history_items),
            dislike_policy: patch.dislike_policy.unwrap_or(self.dislike_policy),
        }
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_personalization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislike_policy: Option<DislikePolicy>,
}
