//! Axum router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse;
use crate::state::AppState;

/// Build the complete router.
///
/// - `GET /world` -- world summary
/// - `GET /leagues/{id}/table` -- league table
/// - `GET /leagues/{id}/top-scorers` -- scorer list
/// - `GET /leagues/{id}/best-defense` -- defensive records
/// - `GET /teams/{id}` -- team detail
/// - `GET /teams/{id}/head-to-head` -- opponent tallies
/// - `GET /matches/{id}/events` -- one match's event slice
/// - `GET /players/{id}/season-stats` -- per-season aggregates
/// - `POST /advance` -- run one matchday
/// - `GET /events/stream` -- SSE replay-then-follow
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/world", get(handlers::get_world))
        .route("/leagues/{id}/table", get(handlers::get_league_table))
        .route("/leagues/{id}/top-scorers", get(handlers::get_top_scorers))
        .route("/leagues/{id}/best-defense", get(handlers::get_best_defense))
        .route("/teams/{id}", get(handlers::get_team))
        .route("/teams/{id}/head-to-head", get(handlers::get_head_to_head))
        .route("/matches/{id}/events", get(handlers::get_match_events))
        .route(
            "/players/{id}/season-stats",
            get(handlers::get_player_season_stats),
        )
        .route("/advance", post(handlers::post_advance))
        .route("/events/stream", get(sse::stream_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
