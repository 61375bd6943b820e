//! Score arithmetic for activity categories.
//!
//! A category score is a saturating counter in `[MIN_SCORE, MAX_SCORE]`.
//! An untouched category sits at 0, so the first like yields 1.

use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i32 = -5;
pub const MAX_SCORE: i32 = 5;

/// Boost added to a category's score for every liked place in it
pub const PLACE_BOOST: f64 = 0.5;

/// A single like or dislike
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn delta(self) -> i32 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }
}

/// Applies one vote to a category score, saturating at the bounds
pub fn apply_vote(current: i32, vote: Vote) -> i32 {
    clamp_score(current.saturating_add(vote.delta()))
}

pub fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

pub fn in_range(score: i32) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Ranking signal: raw category score plus a boost per liked place
pub fn personalized_score(raw: i32, liked_places: usize) -> f64 {
    f64::from(raw) + PLACE_BOOST * liked_places as f64
}
