//! Integration tests for the HTTP API.
//!
//! The router is exercised directly via `tower::ServiceExt::oneshot`
//! without a TCP listener, validating handler logic, routing, and
//! error mapping.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pitchside_brain::Collaborator;
use pitchside_core::Orchestrator;
use pitchside_server::{build_router, AppState};
use pitchside_store::EventStore;
use serde_json::Value;
use tower::ServiceExt;

async fn make_state() -> Arc<AppState> {
    let store = EventStore::in_memory().await.expect("store");
    let orchestrator =
        Orchestrator::bootstrap(store, Collaborator::Mock, Duration::from_secs(5), 42)
            .await
            .expect("bootstrap");
    AppState::new(orchestrator)
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn world_endpoint_reports_genesis() {
    let state = make_state().await;
    let (status, json) = get_json(state, "/world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["season"], 1);
    assert_eq!(json["entities_summary"]["total_teams"], 20);
    assert_eq!(json["leagues"]["premier_fantasy"]["current_matchday"], 1);
    assert_eq!(json["next_fixtures"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn league_table_has_ten_rows() {
    let state = make_state().await;
    let (status, json) = get_json(state, "/leagues/premier_fantasy/table").await;
    assert_eq!(status, StatusCode::OK);
    let table = json["table"].as_array().expect("table");
    assert_eq!(table.len(), 10);
    assert_eq!(table[0]["position"], 1);
}

#[tokio::test]
async fn unknown_league_is_404() {
    let state = make_state().await;
    let (status, json) = get_json(state, "/leagues/serie_z/table").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().expect("error").contains("serie_z"));
}

#[tokio::test]
async fn unknown_team_is_404() {
    let state = make_state().await;
    let (status, _) = get_json(state, "/teams/nonexistent_united").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn team_detail_includes_squad() {
    let state = make_state().await;
    let (status, json) = get_json(state, "/teams/united_dragons").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "United Dragons");
    assert_eq!(json["record"]["played"], 0);
    assert_eq!(json["squad"].as_array().map(Vec::len), Some(16));
}

#[tokio::test]
async fn advance_plays_a_matchday_and_returns_events() {
    let state = make_state().await;
    let response = build_router(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/advance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(json["status"], "matches_completed");
    assert_eq!(json["matches_played"], 10);
    assert!(json["events"].as_array().map_or(0, Vec::len) > 10);

    // The table now reflects one played round.
    let (status, table_json) = get_json(state, "/leagues/premier_fantasy/table").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table_json["table"][0]["played"], 1);
}

#[tokio::test]
async fn match_events_are_served_after_playing() {
    let state = make_state().await;
    // Play one matchday so finished matches exist.
    let _ = build_router(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/advance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("advance");

    let match_id = {
        let orchestrator = state.orchestrator.read().await;
        orchestrator
            .world()
            .matches
            .values()
            .find(|m| m.finished)
            .expect("finished match")
            .id
            .clone()
    };

    let (status, json) = get_json(state, &format!("/matches/{match_id}/events")).await;
    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().expect("events");
    assert!(!events.is_empty());
    assert!(events
        .iter()
        .any(|e| e["kind"] == "MatchEnded"));
}

#[tokio::test]
async fn top_scorers_limit_is_honored() {
    let state = make_state().await;
    let _ = build_router(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/advance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("advance");

    let (status, json) = get_json(state, "/leagues/premier_fantasy/top-scorers?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["top_scorers"].as_array().map_or(99, Vec::len) <= 3);
}

#[tokio::test]
async fn player_season_stats_roundtrip() {
    let state = make_state().await;
    let _ = build_router(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/advance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("advance");

    let player_id = {
        let orchestrator = state.orchestrator.read().await;
        orchestrator
            .world()
            .players
            .values()
            .find(|p| p.season_stats.contains_key(&1))
            .expect("player with stats")
            .id
            .clone()
    };
    let (status, json) = get_json(state, &format!("/players/{player_id}/season-stats?season=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["stats"]["appearances"].as_u64().unwrap_or(0) >= 1);
}
