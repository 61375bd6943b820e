use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Place;

/// Display format for the `date` field of a history entry
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Kind of interaction recorded in history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Like,
    Dislike,
    Visit,
}

/// One immutable interaction event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub action: HistoryAction,
    /// Snapshot of the place at interaction time
    pub place: Place,
    pub category: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub date: String,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, place: &Place, category: &str) -> Self {
        Self::at(action, place, category, Utc::now())
    }

    pub fn at(action: HistoryAction, place: &Place, category: &str, when: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            place: place.clone(),
            category: category.to_string(),
            timestamp: when.timestamp_millis(),
            date: when.format(DISPLAY_DATE_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_carries_epoch_and_display_date() {
        let when = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        let entry = HistoryEntry::at(HistoryAction::Like, &Place::new("p1", "Park"), "park", when);

        assert_eq!(entry.timestamp, when.timestamp_millis());
        assert_eq!(entry.date, "2024-05-17 09:30");
        assert_eq!(entry.place.place_id, "p1");
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(serde_json::to_string(&HistoryAction::Like).unwrap(), "\"like\"");
        assert_eq!(serde_json::to_string(&HistoryAction::Dislike).unwrap(), "\"dislike\"");
        assert_eq!(serde_json::to_string(&HistoryAction::Visit).unwrap(), "\"visit\"");
    }
}
