//! Preference scoring and personalization service for NavixAI.
//!
//! Each profile gets a [`services::PreferenceStore`] holding activity
//! scores, place likes, settings and a capped interaction history,
//! persisted through a [`db::StorageAdapter`]. The [`api`] module exposes
//! the stores over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
