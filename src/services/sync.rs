/// Optional push of place votes to the suggestions backend
///
/// The local engine stays authoritative. A sync target only receives a copy
/// of each accepted vote, and a failed push is logged, never retried.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::Place,
    services::scoring::Vote,
};

/// Body accepted by the backend's preference endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceEvent {
    pub place_id: String,
    pub place_name: String,
    pub activity_type: String,
    pub preference: Vote,
    pub user_id: String,
    pub timestamp: String,
}

impl PreferenceEvent {
    pub fn new(profile: &str, place: &Place, category: &str, vote: Vote) -> Self {
        Self {
            place_id: place.place_id.clone(),
            place_name: place.name.clone(),
            activity_type: category.to_string(),
            preference: vote,
            user_id: profile.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// A remote target that mirrors place votes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceSync: Send + Sync {
    async fn push(&self, event: &PreferenceEvent) -> AppResult<()>;

    /// Target name for logging
    fn name(&self) -> &'static str;
}

/// Posts votes to `{base_url}/api/preferences/`
#[derive(Clone)]
pub struct HttpPreferenceSync {
    http_client: HttpClient,
    base_url: String,
}

impl HttpPreferenceSync {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/preferences/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PreferenceSync for HttpPreferenceSync {
    async fn push(&self, event: &PreferenceEvent) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint())
            .json(event)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Preference sync returned status {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Pushes an event on a background task; failures are only logged
pub fn spawn_push(sync: Arc<dyn PreferenceSync>, event: PreferenceEvent) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match sync.push(&event).await {
            Ok(()) => tracing::debug!(
                target_name = sync.name(),
                place_id = %event.place_id,
                "Preference synced"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                target_name = sync.name(),
                place_id = %event.place_id,
                "Preference sync failed, local state remains authoritative"
            ),
        }
    })
}
