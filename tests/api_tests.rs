use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use navix_prefs::api::{create_router, AppState};

fn create_test_server() -> TestServer {
    let app = create_router(AppState::in_memory());
    TestServer::new(app).unwrap()
}

fn place_vote(place_id: &str, category: &str) -> Value {
    json!({
        "place": {
            "place_id": place_id,
            "name": format!("Place {}", place_id),
            "vicinity": "Market St",
            "rating": 4.4,
            "types": ["restaurant", "food"]
        },
        "category": category
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_like_activity_flow() {
    let server = create_test_server();

    let response = server.post("/api/v1/profiles/alice/activities/museum/like").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["category"], "museum");
    assert_eq!(body["score"], 1);

    let response = server.get("/api/v1/profiles/alice/activities/museum/score").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["score"], 1);
    assert_eq!(body["personalized_score"], 1.0);
}

#[tokio::test]
async fn test_dislike_activity_saturates() {
    let server = create_test_server();

    let mut last = Value::Null;
    for _ in 0..6 {
        last = server
            .post("/api/v1/profiles/alice/activities/bar/dislike")
            .await
            .json();
    }
    assert_eq!(last["score"], -5);
}

#[tokio::test]
async fn test_like_place_flow() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/profiles/alice/places/like")
        .json(&place_vote("p1", "restaurant"))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let status: Value = server.get("/api/v1/profiles/alice/places/p1").await.json();
    assert_eq!(status["liked"], true);

    let liked: Vec<Value> = server.get("/api/v1/profiles/alice/places/liked").await.json();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0]["placeId"], "p1");
    assert_eq!(liked[0]["score"], 1);

    let history: Vec<Value> = server
        .get("/api/v1/profiles/alice/history?limit=1")
        .await
        .json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["action"], "like");
    assert_eq!(history[0]["place"]["place_id"], "p1");

    let preferred: Vec<Value> = server
        .get("/api/v1/profiles/alice/activities/preferred")
        .await
        .json();
    assert_eq!(preferred[0]["category"], "restaurant");
    assert_eq!(preferred[0]["score"], 1);
}

#[tokio::test]
async fn test_like_place_rejects_blank_id() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/profiles/alice/places/like")
        .json(&place_vote("", "restaurant"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let history: Vec<Value> = server.get("/api/v1/profiles/alice/history").await.json();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_invalid_profile_rejected() {
    let server = create_test_server();
    let response = server.get("/api/v1/profiles/bad%20name/settings").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dislike_place_defaults_to_like_only() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/profiles/alice/places/dislike")
        .json(&place_vote("p1", "bar"))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let disliked: Vec<Value> = server.get("/api/v1/profiles/alice/places/disliked").await.json();
    assert!(disliked.is_empty());
    let history: Vec<Value> = server.get("/api/v1/profiles/alice/history").await.json();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_dislike_place_with_full_policy() {
    let server = create_test_server();

    let response = server
        .patch("/api/v1/profiles/alice/settings")
        .json(&json!({ "dislikePolicy": "full" }))
        .await;
    response.assert_status_ok();

    server
        .post("/api/v1/profiles/alice/places/dislike")
        .json(&place_vote("p1", "bar"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let disliked: Vec<Value> = server.get("/api/v1/profiles/alice/places/disliked").await.json();
    assert_eq!(disliked.len(), 1);
    assert_eq!(disliked[0]["score"], -1);

    let score: Value = server
        .get("/api/v1/profiles/alice/activities/bar/score")
        .await
        .json();
    assert_eq!(score["score"], -1);
}

#[tokio::test]
async fn test_sort_activities_by_preference() {
    let server = create_test_server();

    server
        .post("/api/v1/profiles/alice/places/like")
        .json(&place_vote("p1", "restaurant"))
        .await;

    let response = server
        .post("/api/v1/profiles/alice/activities/sort")
        .json(&json!({
            "activities": [
                { "activity_name": "park", "places": [] },
                { "activity_name": "restaurant", "places": [{ "place_id": "p1" }] }
            ]
        }))
        .await;
    response.assert_status_ok();

    let sorted: Vec<Value> = response.json();
    assert_eq!(sorted[0]["activity_name"], "restaurant");
    assert_eq!(sorted[0]["places"][0]["place_id"], "p1");
    assert_eq!(sorted[1]["activity_name"], "park");
}

#[tokio::test]
async fn test_sort_is_identity_when_disabled() {
    let server = create_test_server();

    server.post("/api/v1/profiles/alice/activities/restaurant/like").await;
    server
        .patch("/api/v1/profiles/alice/settings")
        .json(&json!({ "enablePersonalization": false }))
        .await
        .assert_status_ok();

    let input = json!({
        "activities": [
            { "activity_name": "park" },
            { "activity_name": "restaurant" }
        ]
    });
    let sorted: Value = server
        .post("/api/v1/profiles/alice/activities/sort")
        .json(&input)
        .await
        .json();
    assert_eq!(sorted, input["activities"]);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let server = create_test_server();

    let settings: Value = server.get("/api/v1/profiles/alice/settings").await.json();
    assert_eq!(settings["enablePersonalization"], true);
    assert_eq!(settings["maxHistoryItems"], 100);

    let updated: Value = server
        .patch("/api/v1/profiles/alice/settings")
        .json(&json!({ "maxHistoryItems": 10 }))
        .await
        .json();
    assert_eq!(updated["maxHistoryItems"], 10);
    assert_eq!(updated["enablePersonalization"], true);

    let response = server
        .patch("/api/v1/profiles/alice/settings")
        .json(&json!({ "maxHistoryItems": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_place() {
    let server = create_test_server();

    server
        .post("/api/v1/profiles/alice/places/like")
        .json(&place_vote("p1", "cafe"))
        .await;

    let removed: Value = server.delete("/api/v1/profiles/alice/places/p1").await.json();
    assert_eq!(removed["removed"], true);

    let removed: Value = server.delete("/api/v1/profiles/alice/places/p1").await.json();
    assert_eq!(removed["removed"], false);

    let status: Value = server.get("/api/v1/profiles/alice/places/p1").await.json();
    assert_eq!(status["liked"], false);
}

#[tokio::test]
async fn test_export_clear_import() {
    let server = create_test_server();

    server
        .post("/api/v1/profiles/alice/places/like")
        .json(&place_vote("p1", "cafe"))
        .await;
    server.post("/api/v1/profiles/alice/activities/park/like").await;

    let liked_before: Value = server.get("/api/v1/profiles/alice/places/liked").await.json();
    let snapshot: Value = server.get("/api/v1/profiles/alice/export").await.json();
    assert!(snapshot.get("exportDate").is_some());

    server
        .delete("/api/v1/profiles/alice/preferences")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/profiles/alice/history")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let liked: Vec<Value> = server.get("/api/v1/profiles/alice/places/liked").await.json();
    assert!(liked.is_empty());

    let response = server
        .post("/api/v1/profiles/alice/import")
        .json(&snapshot)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let liked_after: Value = server.get("/api/v1/profiles/alice/places/liked").await.json();
    assert_eq!(liked_after, liked_before);
}

#[tokio::test]
async fn test_malformed_import_rejected() {
    let server = create_test_server();

    server.post("/api/v1/profiles/alice/activities/park/like").await;

    let response = server
        .post("/api/v1/profiles/alice/import")
        .json(&json!({ "preferences": { "activityScores": "nope" } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let score: Value = server
        .get("/api/v1/profiles/alice/activities/park/score")
        .await
        .json();
    assert_eq!(score["score"], 1);
}

#[tokio::test]
async fn test_profiles_are_isolated() {
    let server = create_test_server();

    server.post("/api/v1/profiles/alice/activities/park/like").await;

    let score: Value = server
        .get("/api/v1/profiles/bob/activities/park/score")
        .await
        .json();
    assert_eq!(score["score"], 0);
}
