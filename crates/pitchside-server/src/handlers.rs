//! REST endpoint handlers.
//!
//! All read handlers serve projections from the world behind the read
//! lock; `POST /advance` is the only writer. Response shapes are fixed
//! JSON -- the core is insensitive to this layer.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use pitchside_types::{LeagueId, MatchId, PlayerId, TeamId};
use pitchside_world::projections;

use crate::error::ServerError;
use crate::state::{AppState, StreamedEvent};

/// Query parameters for `GET /players/{id}/season-stats`.
#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    /// Season to aggregate; defaults to the current one.
    pub season: Option<u32>,
}

/// Query parameters for scorer/assister lists.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    /// Maximum rows returned (default 10).
    pub limit: Option<usize>,
}

/// `GET /world` -- season, date, league summaries, and what's next.
pub async fn get_world(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let world = orchestrator.world();

    let mut leagues = serde_json::Map::new();
    for (league_id, league) in &world.leagues {
        let table = projections::league_table(world, league_id)?;
        leagues.insert(
            league_id.to_string(),
            json!({
                "name": league.name,
                "current_matchday": league.current_matchday,
                "total_matchdays": league.total_matchdays,
                "season_complete": league.is_season_complete(),
                "table": table,
            }),
        );
    }

    let mut next_fixtures = Vec::new();
    for league in world.leagues.values() {
        if league.is_season_complete() {
            continue;
        }
        for fixture in world.pending_fixtures(&league.id, league.current_matchday) {
            if next_fixtures.len() >= 10 {
                break;
            }
            next_fixtures.push(json!({
                "id": fixture.id,
                "league": fixture.league_id,
                "matchday": fixture.matchday,
                "home_team": world.team(&fixture.home_team_id)?.name,
                "away_team": world.team(&fixture.away_team_id)?.name,
                "date": fixture.date,
                "importance": fixture.importance,
            }));
        }
    }

    Ok(Json(json!({
        "season": world.season,
        "current_date": world.current_date,
        "leagues": leagues,
        "next_fixtures": next_fixtures,
        "entities_summary": {
            "total_players": world.players.len(),
            "total_teams": world.teams.len(),
            "total_owners": world.owners.len(),
            "total_staff": world.staff.len(),
            "total_media_outlets": world.media_outlets.len(),
        },
    })))
}

/// `GET /leagues/{id}/table`.
pub async fn get_league_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let table = projections::league_table(orchestrator.world(), &LeagueId::new(id))?;
    Ok(Json(json!({ "table": table })))
}

/// `GET /leagues/{id}/top-scorers`.
pub async fn get_top_scorers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let world = orchestrator.world();
    let rows = projections::top_scorers(
        world,
        &LeagueId::new(id),
        world.season,
        query.limit.unwrap_or(10),
    )?;
    Ok(Json(json!({ "top_scorers": rows })))
}

/// `GET /leagues/{id}/best-defense`.
pub async fn get_best_defense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let rows = projections::best_defense(orchestrator.world(), &LeagueId::new(id))?;
    Ok(Json(json!({ "best_defense": rows })))
}

/// `GET /teams/{id}`.
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let world = orchestrator.world();
    let team = world.team(&TeamId::new(id))?;
    let squad: Vec<serde_json::Value> = team
        .squad
        .iter()
        .filter_map(|player_id| world.players.get(player_id))
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "position": p.position.to_string(),
                "overall_rating": p.overall_rating(),
                "form": p.form,
                "morale": p.morale,
                "fitness": p.fitness,
                "injured": p.injured,
                "suspended": p.suspended,
            })
        })
        .collect();

    Ok(Json(json!({
        "id": team.id,
        "name": team.name,
        "league": team.league_id,
        "reputation": team.reputation,
        "team_morale": team.team_morale,
        "tactical_familiarity": team.tactical_familiarity,
        "stadium": team.stadium,
        "record": {
            "played": team.record.matches_played,
            "won": team.record.wins,
            "drawn": team.record.draws,
            "lost": team.record.losses,
            "goals_for": team.record.goals_for,
            "goals_against": team.record.goals_against,
            "goal_difference": team.record.goal_difference(),
            "points": team.record.points(),
            "clean_sheets": team.record.clean_sheets,
            "current_streak": team.record.current_streak,
            "recent_form": team.record.recent_form,
        },
        "squad": squad,
    })))
}

/// `GET /teams/{id}/head-to-head`.
pub async fn get_head_to_head(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let map = projections::head_to_head(orchestrator.world(), &TeamId::new(id))?;
    Ok(Json(json!({ "head_to_head": map })))
}

/// `GET /matches/{id}/events` -- the match's slice of the log, in
/// sequence order.
pub async fn get_match_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let match_id = MatchId::new(id);
    let orchestrator = state.orchestrator.read().await;
    // 404 before scanning the log.
    orchestrator.world().match_by_id(&match_id)?;

    let all = orchestrator.store().read_from(1).await?;
    let events: Vec<StreamedEvent> = all
        .into_iter()
        .filter(|sequenced| sequenced.event.payload.match_id() == Some(&match_id))
        .map(|sequenced| StreamedEvent {
            sequence: sequenced.sequence,
            event: sequenced.event,
        })
        .collect();
    Ok(Json(json!({ "match_id": match_id, "events": events })))
}

/// `GET /players/{id}/season-stats?season=`.
pub async fn get_player_season_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let orchestrator = state.orchestrator.read().await;
    let world = orchestrator.world();
    let player_id = PlayerId::new(id);
    let season = query.season.unwrap_or(world.season);
    let stats = projections::player_season_stats(world, &player_id, season)?;
    let player = world.player(&player_id)?;
    Ok(Json(json!({
        "player_id": player_id,
        "name": player.name,
        "season": season,
        "stats": stats,
    })))
}

/// `POST /advance` -- run one matchday and return the summary.
pub async fn post_advance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut orchestrator = state.orchestrator.write().await;
    let before = orchestrator.store().latest_sequence().await?;
    let summary = orchestrator.advance().await?;
    let appended = orchestrator.store().read_from(before + 1).await?;
    drop(orchestrator);

    let events: Vec<StreamedEvent> = appended
        .into_iter()
        .map(|sequenced| StreamedEvent {
            sequence: sequenced.sequence,
            event: sequenced.event,
        })
        .collect();
    state.broadcast(events.iter().cloned());

    Ok(Json(json!({
        "status": summary.status,
        "matches_played": summary.matches_played,
        "season": summary.season,
        "events": events,
    })))
}
