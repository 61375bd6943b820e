mod activity;
mod history;
mod place;
mod settings;
mod snapshot;

pub use activity::{Activity, PreferredActivity};
pub use history::{HistoryAction, HistoryEntry};
pub use place::{Place, PlaceRecord};
pub use settings::{DislikePolicy, Settings, SettingsPatch, DEFAULT_MAX_HISTORY_ITEMS};
pub use snapshot::{ExportSnapshot, PreferencesBlob};

use crate::error::{AppError, AppResult};

/// Rejects empty or whitespace-only identifiers
pub fn require_non_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
