use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::require_non_blank;
use crate::error::AppResult;

/// A place as delivered by the suggestions backend
///
/// Only the public fields are kept; history entries store a copy of this
/// shape so later changes to a `PlaceRecord` never rewrite the past.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    #[serde(alias = "id")]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl Place {
    /// Creates a place with only an id and a display name
    pub fn new(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            vicinity: None,
            rating: None,
            types: Vec::new(),
        }
    }

    /// Checks the place id and fills a missing display name with the id
    pub fn validated(&self) -> AppResult<Place> {
        require_non_blank("place_id", &self.place_id)?;

        let mut place = self.clone();
        if place.name.trim().is_empty() {
            place.name = place.place_id.clone();
        }
        Ok(place)
    }
}

/// A place the user expressed an opinion about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    /// Activity category the place was scored under
    pub category: String,
    /// Cumulative score; positive means liked
    pub score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceRecord {
    pub fn new(place: &Place, category: &str) -> Self {
        Self {
            place_id: place.place_id.clone(),
            name: place.name.clone(),
            category: category.to_string(),
            score: 0,
            vicinity: place.vicinity.clone(),
            rating: place.rating,
            updated_at: Utc::now(),
        }
    }

    /// Refreshes denormalized fields from a newer sighting of the place
    pub fn touch(&mut self, place: &Place, category: &str) {
        self.name = place.name.clone();
        self.category = category.to_string();
        if place.vicinity.is_some() {
            self.vicinity = place.vicinity.clone();
        }
        if place.rating.is_some() {
            self.rating = place.rating;
        }
        self.updated_at = Utc::now();
    }

    pub fn is_liked(&self) -> bool {
        self.score > 0
    }
}
