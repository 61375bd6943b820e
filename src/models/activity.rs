use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An activity suggestion as returned by the suggestions backend
///
/// Only `activity_name` is interpreted; every other field is carried through
/// untouched so a sorted list can be handed straight back to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub activity_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn new(activity_name: impl Into<String>) -> Self {
        Self {
            activity_name: activity_name.into(),
            extra: Map::new(),
        }
    }
}

/// A category the user has a positive score for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferredActivity {
    pub category: String,
    pub score: i32,
}
