use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        Activity, ExportSnapshot, HistoryEntry, Place, PlaceRecord, PreferredActivity, Settings,
        SettingsPatch,
    },
    services::{sync, PreferenceEvent, Vote, DEFAULT_HISTORY_LIMIT},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PlaceVoteRequest {
    pub place: Place,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct SortActivitiesRequest {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CategoryScoreResponse {
    pub category: String,
    pub score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalized_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlaceStatusResponse {
    pub place_id: String,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovePlaceResponse {
    pub place_id: String,
    pub removed: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Raw and personalized score of one category
pub async fn activity_score(
    State(state): State<AppState>,
    Path((profile, category)): Path<(String, String)>,
) -> AppResult<Json<CategoryScoreResponse>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(CategoryScoreResponse {
        score: store.activity_score(&category).await,
        personalized_score: Some(store.personalized_score(&category).await),
        category,
    }))
}

pub async fn like_activity(
    State(state): State<AppState>,
    Path((profile, category)): Path<(String, String)>,
) -> AppResult<Json<CategoryScoreResponse>> {
    let store = state.registry.store(&profile).await?;
    let score = store.like_activity(&category).await?;
    Ok(Json(CategoryScoreResponse {
        category,
        score,
        personalized_score: None,
    }))
}

pub async fn dislike_activity(
    State(state): State<AppState>,
    Path((profile, category)): Path<(String, String)>,
) -> AppResult<Json<CategoryScoreResponse>> {
    let store = state.registry.store(&profile).await?;
    let score = store.dislike_activity(&category).await?;
    Ok(Json(CategoryScoreResponse {
        category,
        score,
        personalized_score: None,
    }))
}

pub async fn preferred_activities(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<Json<Vec<PreferredActivity>>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.preferred_activities().await))
}

/// Orders a suggestion list by the profile's preferences
pub async fn sort_activities(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(request): Json<SortActivitiesRequest>,
) -> AppResult<Json<Vec<Activity>>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.sort_activities(request.activities).await))
}

pub async fn liked_places(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<Json<Vec<PlaceRecord>>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.liked_places().await))
}

pub async fn disliked_places(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<Json<Vec<PlaceRecord>>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.disliked_places().await))
}

/// Records a place like and mirrors it to the sync target
pub async fn like_place(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PlaceVoteRequest>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        profile = %profile,
        place_id = %request.place.place_id,
        "Processing place like"
    );

    let store = state.registry.store(&profile).await?;
    store.like_place(&request.place, &request.category).await?;
    push_vote(&state, &profile, request, Vote::Like);
    Ok(StatusCode::NO_CONTENT)
}

/// Records a place dislike under the profile's dislike policy
///
/// The vote is mirrored to the sync backend even when `LikeOnly` makes the
/// engine ignore it, since the backend keeps its own record of dislikes.
pub async fn dislike_place(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PlaceVoteRequest>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        profile = %profile,
        place_id = %request.place.place_id,
        "Processing place dislike"
    );

    let store = state.registry.store(&profile).await?;
    store.dislike_place(&request.place, &request.category).await?;
    push_vote(&state, &profile, request, Vote::Dislike);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_visit(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(request): Json<PlaceVoteRequest>,
) -> AppResult<StatusCode> {
    let store = state.registry.store(&profile).await?;
    store.record_visit(&request.place, &request.category).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn place_status(
    State(state): State<AppState>,
    Path((profile, place_id)): Path<(String, String)>,
) -> AppResult<Json<PlaceStatusResponse>> {
    let store = state.registry.store(&profile).await?;
    let liked = store.is_place_liked(&place_id).await;
    Ok(Json(PlaceStatusResponse { place_id, liked }))
}

pub async fn remove_place(
    State(state): State<AppState>,
    Path((profile, place_id)): Path<(String, String)>,
) -> AppResult<Json<RemovePlaceResponse>> {
    let store = state.registry.store(&profile).await?;
    let removed = store.remove_place(&place_id).await?;
    Ok(Json(RemovePlaceResponse { place_id, removed }))
}

pub async fn history(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let store = state.registry.store(&profile).await?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(store.history(limit).await))
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<StatusCode> {
    let store = state.registry.store(&profile).await?;
    store.clear_history().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_preferences(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<StatusCode> {
    let store = state.registry.store(&profile).await?;
    store.clear_preferences().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<Json<Settings>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.settings().await))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(patch): Json<SettingsPatch>,
) -> AppResult<Json<Settings>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.update_settings(patch).await?))
}

pub async fn export_data(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> AppResult<Json<ExportSnapshot>> {
    let store = state.registry.store(&profile).await?;
    Ok(Json(store.export_data().await))
}

/// Restores a snapshot; a malformed one is rejected with 400 and changes nothing
pub async fn import_data(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(snapshot): Json<Value>,
) -> AppResult<Json<Value>> {
    let store = state.registry.store(&profile).await?;
    store.import_data(&snapshot).await?;
    Ok(Json(json!({ "success": true })))
}

fn push_vote(state: &AppState, profile: &str, request: PlaceVoteRequest, vote: Vote) {
    if let Some(target) = &state.sync {
        let place = match request.place.validated() {
            Ok(place) => place,
            Err(_) => return,
        };
        let event = PreferenceEvent::new(profile, &place, &request.category, vote);
        sync::spawn_push(target.clone(), event);
    }
}
