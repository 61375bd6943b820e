use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1/profiles/:profile", profile_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Routes scoped to a single profile
fn profile_routes() -> Router<AppState> {
    Router::new()
        // Activity categories
        .route("/activities/preferred", get(handlers::preferred_activities))
        .route("/activities/sort", post(handlers::sort_activities))
        .route("/activities/:category/score", get(handlers::activity_score))
        .route("/activities/:category/like", post(handlers::like_activity))
        .route("/activities/:category/dislike", post(handlers::dislike_activity))
        // Places
        .route("/places/liked", get(handlers::liked_places))
        .route("/places/disliked", get(handlers::disliked_places))
        .route("/places/like", post(handlers::like_place))
        .route("/places/dislike", post(handlers::dislike_place))
        .route("/places/visit", post(handlers::record_visit))
        .route(
            "/places/:place_id",
            get(handlers::place_status).delete(handlers::remove_place),
        )
        // History and settings
        .route(
            "/history",
            get(handlers::history).delete(handlers::clear_history),
        )
        .route(
            "/preferences",
            axum::routing::delete(handlers::clear_preferences),
        )
        .route(
            "/settings",
            get(handlers::get_settings).patch(handlers::update_settings),
        )
        // Backup
        .route("/export", get(handlers::export_data))
        .route("/import", post(handlers::import_data))
}
