//! Read-only projections over the world.
//!
//! Every projection is a pure fold over world state, which is itself a
//! fold over the event log -- so projecting from either source gives
//! the same answer by construction. The HTTP layer serializes these
//! rows directly.

use serde::Serialize;

use pitchside_types::{HeadToHead, LeagueId, PlayerId, SeasonStats, TeamId};

use crate::error::WorldError;
use crate::world::World;

/// One row of a league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// 1-based table position.
    pub position: u32,
    /// Team id.
    pub team_id: TeamId,
    /// Team name.
    pub team: String,
    /// Matches played.
    pub played: u32,
    /// Wins.
    pub won: u32,
    /// Draws.
    pub drawn: u32,
    /// Losses.
    pub lost: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// Goal difference.
    pub goal_difference: i64,
    /// League points.
    pub points: u32,
}

/// One row of a top-scorer or top-assister list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorerRow {
    /// Player id.
    pub player_id: PlayerId,
    /// Player name.
    pub player: String,
    /// The player's team id.
    pub team_id: TeamId,
    /// Goals in the season.
    pub goals: u32,
    /// Assists in the season.
    pub assists: u32,
}

/// One row of a best-defense list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefenseRow {
    /// Team id.
    pub team_id: TeamId,
    /// Team name.
    pub team: String,
    /// Goals conceded.
    pub goals_against: u32,
    /// Clean sheets kept.
    pub clean_sheets: u32,
}

/// The league table, sorted by points, goal difference, goals for, and
/// name ascending as the final tie-break.
pub fn league_table(world: &World, league_id: &LeagueId) -> Result<Vec<TableRow>, WorldError> {
    let league = world.league(league_id)?;
    let mut rows: Vec<TableRow> = Vec::with_capacity(league.teams.len());
    for team_id in &league.teams {
        let team = world.team(team_id)?;
        rows.push(TableRow {
            position: 0,
            team_id: team.id.clone(),
            team: team.name.clone(),
            played: team.record.matches_played,
            won: team.record.wins,
            drawn: team.record.draws,
            lost: team.record.losses,
            goals_for: team.record.goals_for,
            goals_against: team.record.goals_against,
            goal_difference: team.record.goal_difference(),
            points: team.record.points(),
        });
    }
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference.cmp(&a.goal_difference))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.team.cmp(&b.team))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
    Ok(rows)
}

/// Collect per-player season lines for one league.
fn season_lines(
    world: &World,
    league_id: &LeagueId,
    season: u32,
) -> Result<Vec<ScorerRow>, WorldError> {
    let league = world.league(league_id)?;
    let mut rows = Vec::new();
    for team_id in &league.teams {
        let team = world.team(team_id)?;
        for player_id in &team.squad {
            let player = world.player(player_id)?;
            if let Some(stats) = player.season_stats.get(&season) {
                if stats.goals > 0 || stats.assists > 0 {
                    rows.push(ScorerRow {
                        player_id: player.id.clone(),
                        player: player.name.clone(),
                        team_id: team.id.clone(),
                        goals: stats.goals,
                        assists: stats.assists,
                    });
                }
            }
        }
    }
    Ok(rows)
}

/// Top scorers of a league season, goals descending.
pub fn top_scorers(
    world: &World,
    league_id: &LeagueId,
    season: u32,
    limit: usize,
) -> Result<Vec<ScorerRow>, WorldError> {
    let mut rows = season_lines(world, league_id, season)?;
    rows.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then_with(|| b.assists.cmp(&a.assists))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows.truncate(limit);
    Ok(rows)
}

/// Top assisters of a league season, assists descending.
pub fn top_assisters(
    world: &World,
    league_id: &LeagueId,
    season: u32,
    limit: usize,
) -> Result<Vec<ScorerRow>, WorldError> {
    let mut rows = season_lines(world, league_id, season)?;
    rows.sort_by(|a, b| {
        b.assists
            .cmp(&a.assists)
            .then_with(|| b.goals.cmp(&a.goals))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows.retain(|r| r.assists > 0);
    rows.truncate(limit);
    Ok(rows)
}

/// Defensive records of a league, fewest conceded first.
pub fn best_defense(world: &World, league_id: &LeagueId) -> Result<Vec<DefenseRow>, WorldError> {
    let league = world.league(league_id)?;
    let mut rows: Vec<DefenseRow> = Vec::with_capacity(league.teams.len());
    for team_id in &league.teams {
        let team = world.team(team_id)?;
        rows.push(DefenseRow {
            team_id: team.id.clone(),
            team: team.name.clone(),
            goals_against: team.record.goals_against,
            clean_sheets: team.record.clean_sheets,
        });
    }
    rows.sort_by(|a, b| {
        a.goals_against
            .cmp(&b.goals_against)
            .then_with(|| b.clean_sheets.cmp(&a.clean_sheets))
            .then_with(|| a.team.cmp(&b.team))
    });
    Ok(rows)
}

/// A team's head-to-head map.
pub fn head_to_head(
    world: &World,
    team_id: &TeamId,
) -> Result<std::collections::BTreeMap<TeamId, HeadToHead>, WorldError> {
    Ok(world.team(team_id)?.head_to_head.clone())
}

/// One player's aggregates for one season, if they appeared.
pub fn player_season_stats(
    world: &World,
    player_id: &PlayerId,
    season: u32,
) -> Result<Option<SeasonStats>, WorldError> {
    Ok(world.player(player_id)?.season_stats.get(&season).cloned())
}
