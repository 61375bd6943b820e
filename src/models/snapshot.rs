use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoryEntry, PlaceRecord, Settings};

/// Everything persisted under the preferences key of a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBlob {
    /// Category → score in `[MIN_SCORE, MAX_SCORE]`
    #[serde(default)]
    pub activity_scores: BTreeMap<String, i32>,
    /// Place id → record
    #[serde(default)]
    pub place_scores: BTreeMap<String, PlaceRecord>,
    #[serde(default)]
    pub settings: Settings,
}

/// Backup produced by `export_data` and accepted by `import_data`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub preferences: PreferencesBlob,
    pub history: Vec<HistoryEntry>,
    pub export_date: DateTime<Utc>,
}
