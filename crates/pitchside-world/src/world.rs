//! The world aggregate: the single in-memory root of all entities.
//!
//! The world exclusively owns every entity; components borrow read-only
//! views and return events. The only mutating pathway is
//! [`World::apply`], a pure function over `(world, event)` that
//! performs no I/O. Folding the same event sequence over the same
//! genesis always reproduces the same world, which is what makes the
//! event log the source of truth and the in-memory world a cache.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use pitchside_types::{
    Event, EventPayload, InjuryRecord, League, LeagueId, Match, MatchId, MediaOutlet,
    MediaOutletId, Owner, OwnerId, Player, PlayerId, StaffId, StaffMember, Team, TeamId,
};

use crate::error::WorldError;

/// Suspension handed out for a straight red card, in matches.
pub const STRAIGHT_RED_SUSPENSION: u32 = 3;

/// Suspension handed out for a second-yellow dismissal, in matches.
pub const SECOND_YELLOW_SUSPENSION: u32 = 1;

/// Fitness cost of playing a full match.
pub const MATCH_FITNESS_COST: f64 = 12.0;

/// Fitness recovered by every player each week.
pub const WEEKLY_FITNESS_RECOVERY: f64 = 10.0;

/// Days between matchdays.
pub const DAYS_PER_MATCHDAY: u64 = 7;

/// Headlines kept per media outlet.
const MAX_ACTIVE_STORIES: usize = 10;

/// Per-match scratch tallies accumulated while a match's events are
/// being applied, consumed by the `MatchEnded` form drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct MatchTally {
    goals: BTreeMap<PlayerId, u32>,
    assists: BTreeMap<PlayerId, u32>,
    yellows: BTreeMap<PlayerId, u32>,
    reds: BTreeMap<PlayerId, u32>,
}

/// The complete game world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Current season number, starting at 1.
    pub season: u32,
    /// Current calendar date.
    pub current_date: NaiveDate,
    /// The 64-bit seed every derived RNG descends from.
    pub seed: u64,
    /// Leagues by id.
    pub leagues: BTreeMap<LeagueId, League>,
    /// Teams by id.
    pub teams: BTreeMap<TeamId, Team>,
    /// Players by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Matches by id, scheduled and finished.
    pub matches: BTreeMap<MatchId, Match>,
    /// Club owners by id.
    pub owners: BTreeMap<OwnerId, Owner>,
    /// Backroom staff by id.
    pub staff: BTreeMap<StaffId, StaffMember>,
    /// Media outlets by id.
    pub media_outlets: BTreeMap<MediaOutletId, MediaOutlet>,
    /// Configured rivalry pairings (unordered).
    pub rivalries: Vec<(TeamId, TeamId)>,
    /// In-flight per-match tallies; always empty between matchdays.
    #[serde(default, skip)]
    pub(crate) pending_tallies: BTreeMap<MatchId, MatchTally>,
}

impl World {
    /// Resolve a league or fail.
    pub fn league(&self, id: &LeagueId) -> Result<&League, WorldError> {
        self.leagues
            .get(id)
            .ok_or_else(|| WorldError::UnknownLeague(id.to_string()))
    }

    /// Resolve a team or fail.
    pub fn team(&self, id: &TeamId) -> Result<&Team, WorldError> {
        self.teams
            .get(id)
            .ok_or_else(|| WorldError::UnknownTeam(id.to_string()))
    }

    /// Resolve a player or fail.
    pub fn player(&self, id: &PlayerId) -> Result<&Player, WorldError> {
        self.players
            .get(id)
            .ok_or_else(|| WorldError::UnknownPlayer(id.to_string()))
    }

    /// Resolve a match or fail.
    pub fn match_by_id(&self, id: &MatchId) -> Result<&Match, WorldError> {
        self.matches
            .get(id)
            .ok_or_else(|| WorldError::UnknownMatch(id.to_string()))
    }

    /// Whether the given pair is a configured rivalry.
    pub fn is_rivalry(&self, a: &TeamId, b: &TeamId) -> bool {
        self.rivalries
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Unfinished matches of a league's given matchday, ordered by
    /// `(home, away)` for deterministic iteration.
    pub fn pending_fixtures(&self, league_id: &LeagueId, matchday: u32) -> Vec<&Match> {
        let mut fixtures: Vec<&Match> = self
            .matches
            .values()
            .filter(|m| {
                m.league_id == *league_id
                    && m.season == self.season
                    && m.matchday == matchday
                    && !m.finished
            })
            .collect();
        fixtures.sort_by(|a, b| {
            a.home_team_id
                .cmp(&b.home_team_id)
                .then_with(|| a.away_team_id.cmp(&b.away_team_id))
        });
        fixtures
    }

    /// Whether every league has completed its season.
    pub fn all_seasons_complete(&self) -> bool {
        self.leagues.values().all(League::is_season_complete)
    }

    // -----------------------------------------------------------------------
    // The single mutating pathway
    // -----------------------------------------------------------------------

    /// Apply one event to the world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] when the event references an unresolvable
    /// id or would violate a world invariant (e.g. sealing a finished
    /// match twice). The world is unchanged on error.
    pub fn apply(&mut self, event: &Event) -> Result<(), WorldError> {
        match &event.payload {
            EventPayload::WorldInitialized { season, seed, .. } => {
                self.season = *season;
                self.seed = *seed;
                Ok(())
            }

            EventPayload::MatchScheduled {
                match_id,
                league_id,
                matchday,
                season,
                home_team_id,
                away_team_id,
                date,
                weather,
                attendance,
                atmosphere_rating,
                importance,
            } => {
                self.league(league_id)?;
                self.team(home_team_id)?;
                self.team(away_team_id)?;
                self.matches.insert(
                    match_id.clone(),
                    Match {
                        id: match_id.clone(),
                        league_id: league_id.clone(),
                        matchday: *matchday,
                        season: *season,
                        home_team_id: home_team_id.clone(),
                        away_team_id: away_team_id.clone(),
                        date: *date,
                        finished: false,
                        home_score: 0,
                        away_score: 0,
                        weather: *weather,
                        attendance: *attendance,
                        atmosphere_rating: *atmosphere_rating,
                        importance: *importance,
                    },
                );
                Ok(())
            }

            EventPayload::MatchStarted { match_id, .. } | EventPayload::KickOff { match_id } => {
                self.match_by_id(match_id)?;
                Ok(())
            }

            EventPayload::Goal {
                match_id,
                scorer,
                assist,
                ..
            } => {
                let season = self.match_by_id(match_id)?.season;
                {
                    let player = self.player_mut(scorer)?;
                    player.season_stats_mut(season).goals += 1;
                }
                if let Some(assist_id) = assist {
                    let player = self.player_mut(assist_id)?;
                    player.season_stats_mut(season).assists += 1;
                }
                let tally = self.pending_tallies.entry(match_id.clone()).or_default();
                *tally.goals.entry(scorer.clone()).or_default() += 1;
                if let Some(assist_id) = assist {
                    *tally.assists.entry(assist_id.clone()).or_default() += 1;
                }
                Ok(())
            }

            EventPayload::YellowCard {
                match_id, player, ..
            } => {
                let season = self.match_by_id(match_id)?.season;
                {
                    let entry = self.player_mut(player)?;
                    entry.yellow_cards += 1;
                    entry.season_stats_mut(season).yellows += 1;
                }
                let tally = self.pending_tallies.entry(match_id.clone()).or_default();
                *tally.yellows.entry(player.clone()).or_default() += 1;
                Ok(())
            }

            EventPayload::RedCard {
                match_id,
                player,
                second_yellow,
                ..
            } => {
                let season = self.match_by_id(match_id)?.season;
                {
                    let entry = self.player_mut(player)?;
                    entry.red_cards += 1;
                    entry.season_stats_mut(season).reds += 1;
                    entry.suspended = true;
                    entry.suspension_matches_remaining = if *second_yellow {
                        SECOND_YELLOW_SUSPENSION
                    } else {
                        STRAIGHT_RED_SUSPENSION
                    };
                }
                let tally = self.pending_tallies.entry(match_id.clone()).or_default();
                *tally.reds.entry(player.clone()).or_default() += 1;
                Ok(())
            }

            EventPayload::Substitution { match_id, .. }
            | EventPayload::CornerKick { match_id, .. }
            | EventPayload::Foul { match_id, .. }
            | EventPayload::FreeKick { match_id, .. }
            | EventPayload::PenaltyAwarded { match_id, .. }
            | EventPayload::Offside { match_id, .. } => {
                self.match_by_id(match_id)?;
                Ok(())
            }

            EventPayload::Injury {
                match_id,
                player,
                description,
                weeks_out,
                ..
            } => {
                let season = self.match_by_id(match_id)?.season;
                let entry = self.player_mut(player)?;
                entry.injured = true;
                entry.injury_weeks_remaining = (*weeks_out).max(entry.injury_weeks_remaining);
                entry.injury_history.push(InjuryRecord {
                    season,
                    description: description.clone(),
                    weeks_out: *weeks_out,
                });
                Ok(())
            }

            EventPayload::MatchEnded {
                match_id,
                home_team_id,
                away_team_id,
                home_score,
                away_score,
                player_ratings,
                ..
            } => self.apply_match_ended(
                match_id,
                home_team_id,
                away_team_id,
                *home_score,
                *away_score,
                player_ratings,
            ),

            EventPayload::MatchAborted { match_id, .. } => {
                // The match stays unfinished; scratch tallies (there
                // should be none, since aborted matches append no other
                // events) are discarded.
                self.pending_tallies.remove(match_id);
                Ok(())
            }

            EventPayload::SoftStateUpdated {
                target_kind,
                target_id,
                field,
                value,
                ..
            } => self.apply_soft_state(target_kind, target_id, field, *value),

            EventPayload::ValidationFailed { .. } => Ok(()),

            EventPayload::HeadToHeadUpdated {
                team_id,
                opponent_id,
                wins,
                draws,
                losses,
            } => {
                let opponent = opponent_id.clone();
                let team = self
                    .teams
                    .get_mut(team_id)
                    .ok_or_else(|| WorldError::UnknownTeam(team_id.to_string()))?;
                let entry = team.head_to_head.entry(opponent).or_default();
                entry.wins = *wins;
                entry.draws = *draws;
                entry.losses = *losses;
                Ok(())
            }

            EventPayload::MediaStoryPublished {
                outlet_id,
                headline,
                ..
            } => {
                if let Some(outlet) = self.media_outlets.get_mut(outlet_id) {
                    outlet.active_stories.push(headline.clone());
                    while outlet.active_stories.len() > MAX_ACTIVE_STORIES {
                        outlet.active_stories.remove(0);
                    }
                } else {
                    warn!(outlet = %outlet_id, "story for unknown media outlet dropped");
                }
                Ok(())
            }

            EventPayload::OwnerStatementIssued { owner_id, .. } => {
                // Statements live in the log; the owner entity is
                // unchanged, but the id must resolve.
                if !self.owners.contains_key(owner_id) {
                    warn!(owner = %owner_id, "statement from unknown owner");
                }
                Ok(())
            }

            EventPayload::SeasonEnded {
                league_id,
                season,
                champion,
                top_scorer,
                ..
            } => {
                {
                    let league = self
                        .leagues
                        .get_mut(league_id)
                        .ok_or_else(|| WorldError::UnknownLeague(league_id.to_string()))?;
                    league.champions_by_season.insert(*season, champion.clone());
                    if let Some(scorer) = top_scorer {
                        league.top_scorers_by_season.insert(*season, scorer.clone());
                    }
                }
                if let Some(scorer) = top_scorer {
                    let season_number = *season;
                    if let Some(player) = self.players.get_mut(scorer) {
                        player.awards.push(pitchside_types::Award {
                            season: season_number,
                            title: String::from("Golden Boot"),
                        });
                    }
                }
                // Once every league has crowned a champion for this
                // season, roll the world over to the next one.
                if self
                    .leagues
                    .values()
                    .all(|l| l.champions_by_season.contains_key(season))
                {
                    self.roll_over_season();
                }
                Ok(())
            }
        }
    }

    fn player_mut(&mut self, id: &PlayerId) -> Result<&mut Player, WorldError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| WorldError::UnknownPlayer(id.to_string()))
    }

    /// Seal a match result and fold it into teams and players.
    fn apply_match_ended(
        &mut self,
        match_id: &MatchId,
        home_team_id: &TeamId,
        away_team_id: &TeamId,
        home_score: u32,
        away_score: u32,
        player_ratings: &BTreeMap<PlayerId, f32>,
    ) -> Result<(), WorldError> {
        let (league_id, matchday, match_date) = {
            let m = self
                .matches
                .get_mut(match_id)
                .ok_or_else(|| WorldError::UnknownMatch(match_id.to_string()))?;
            if m.finished {
                return Err(WorldError::MatchAlreadyFinished(match_id.to_string()));
            }
            m.finished = true;
            m.home_score = home_score;
            m.away_score = away_score;
            (m.league_id.clone(), m.matchday, m.date)
        };

        // Team records and incremental head-to-head.
        {
            let home = self
                .teams
                .get_mut(home_team_id)
                .ok_or_else(|| WorldError::UnknownTeam(home_team_id.to_string()))?;
            home.record.record_result(home_score, away_score, true);
            let entry = home.head_to_head.entry(away_team_id.clone()).or_default();
            if home_score > away_score {
                entry.wins += 1;
            } else if home_score < away_score {
                entry.losses += 1;
            } else {
                entry.draws += 1;
            }
        }
        {
            let away = self
                .teams
                .get_mut(away_team_id)
                .ok_or_else(|| WorldError::UnknownTeam(away_team_id.to_string()))?;
            away.record.record_result(away_score, home_score, false);
            let entry = away.head_to_head.entry(home_team_id.clone()).or_default();
            if away_score > home_score {
                entry.wins += 1;
            } else if away_score < home_score {
                entry.losses += 1;
            } else {
                entry.draws += 1;
            }
        }

        // Per-player consequences: appearance stats, rating fold, match
        // fatigue, and engine-driven form drift.
        let season = self.season;
        let tally = self.pending_tallies.remove(match_id).unwrap_or_default();
        for (player_id, rating) in player_ratings {
            let home_won = home_score > away_score;
            let drawn = home_score == away_score;
            let player = self
                .players
                .get_mut(player_id)
                .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
            let stats = player.season_stats_mut(season);
            stats.appearances += 1;
            stats.minutes += 90;
            stats.record_rating(*rating);

            player.set_fitness(f64::from(player.fitness) - MATCH_FITNESS_COST);

            let won = if player.team_id == *home_team_id {
                home_won
            } else {
                !home_won && !drawn
            };
            let goals = tally.goals.get(player_id).copied().unwrap_or(0) as i64;
            let assists = tally.assists.get(player_id).copied().unwrap_or(0) as i64;
            let yellows = tally.yellows.get(player_id).copied().unwrap_or(0) as i64;
            let reds = tally.reds.get(player_id).copied().unwrap_or(0) as i64;
            let result_drift = if won {
                1
            } else if drawn {
                0
            } else {
                -1
            };
            let drift = goals * 3 + assists * 2 + result_drift - yellows - reds * 3;
            player.set_form(f64::from(player.form) + drift as f64);
        }

        // Suspended players served a match by missing this one.
        for team_id in [home_team_id, away_team_id] {
            let squad = self
                .teams
                .get(team_id)
                .map(|t| t.squad.clone())
                .unwrap_or_default();
            for player_id in squad {
                if player_ratings.contains_key(&player_id) {
                    continue;
                }
                if let Some(player) = self.players.get_mut(&player_id) {
                    if player.suspended {
                        player.suspension_matches_remaining =
                            player.suspension_matches_remaining.saturating_sub(1);
                        if player.suspension_matches_remaining == 0 {
                            player.suspended = false;
                        }
                    }
                }
            }
        }

        // If this sealed the league's matchday, advance its calendar
        // and run weekly progression for its players.
        let matchday_complete = !self
            .matches
            .values()
            .any(|m| {
                m.league_id == league_id
                    && m.season == season
                    && m.matchday == matchday
                    && !m.finished
            });
        if matchday_complete {
            if let Some(league) = self.leagues.get_mut(&league_id) {
                if league.current_matchday == matchday {
                    league.current_matchday += 1;
                }
            }
            if let Some(next_date) = match_date.checked_add_days(Days::new(DAYS_PER_MATCHDAY)) {
                self.current_date = self.current_date.max(next_date);
            }
            self.weekly_progression(&league_id);
        }

        Ok(())
    }

    /// Weekly recovery for every player in the league: fitness back up,
    /// injuries heal week by week.
    fn weekly_progression(&mut self, league_id: &LeagueId) {
        let team_ids: Vec<TeamId> = self
            .teams
            .values()
            .filter(|t| t.league_id == *league_id)
            .map(|t| t.id.clone())
            .collect();
        for team_id in team_ids {
            let squad = self
                .teams
                .get(&team_id)
                .map(|t| t.squad.clone())
                .unwrap_or_default();
            for player_id in squad {
                if let Some(player) = self.players.get_mut(&player_id) {
                    player.set_fitness(f64::from(player.fitness) + WEEKLY_FITNESS_RECOVERY);
                    if player.injured {
                        player.injury_weeks_remaining =
                            player.injury_weeks_remaining.saturating_sub(1);
                        if player.injury_weeks_remaining == 0 {
                            player.injured = false;
                        }
                    }
                }
            }
        }
    }

    /// Apply a validated soft-state change.
    fn apply_soft_state(
        &mut self,
        target_kind: &str,
        target_id: &str,
        field: &str,
        value: f64,
    ) -> Result<(), WorldError> {
        match target_kind {
            "player" => {
                let player = self
                    .players
                    .get_mut(&PlayerId::new(target_id))
                    .ok_or_else(|| WorldError::UnknownPlayer(target_id.to_owned()))?;
                match field {
                    "form" => player.set_form(value),
                    "morale" => player.set_morale(value),
                    "fitness" => player.set_fitness(value),
                    "reputation" => player.set_reputation(value),
                    other => {
                        return Err(WorldError::InvariantViolation(format!(
                            "soft update for unvalidated player field: {other}"
                        )))
                    }
                }
            }
            "team" => {
                let team = self
                    .teams
                    .get_mut(&TeamId::new(target_id))
                    .ok_or_else(|| WorldError::UnknownTeam(target_id.to_owned()))?;
                match field {
                    "team_morale" => team.set_team_morale(value),
                    "tactical_familiarity" => team.set_tactical_familiarity(value),
                    "reputation" => team.set_reputation(value),
                    other => {
                        return Err(WorldError::InvariantViolation(format!(
                            "soft update for unvalidated team field: {other}"
                        )))
                    }
                }
            }
            "owner" => {
                let owner = self
                    .owners
                    .get_mut(&OwnerId::new(target_id))
                    .ok_or_else(|| {
                        WorldError::InvariantViolation(format!("unknown owner: {target_id}"))
                    })?;
                match field {
                    "public_approval" => owner.set_public_approval(value),
                    other => {
                        return Err(WorldError::InvariantViolation(format!(
                            "soft update for unvalidated owner field: {other}"
                        )))
                    }
                }
            }
            "staff" => {
                let staff = self.staff.get_mut(&StaffId::new(target_id)).ok_or_else(|| {
                    WorldError::InvariantViolation(format!("unknown staff member: {target_id}"))
                })?;
                match field {
                    "team_rapport" => staff.set_team_rapport(value),
                    other => {
                        return Err(WorldError::InvariantViolation(format!(
                            "soft update for unvalidated staff field: {other}"
                        )))
                    }
                }
            }
            other => {
                return Err(WorldError::InvariantViolation(format!(
                    "soft update for unknown target kind: {other}"
                )))
            }
        }
        Ok(())
    }

    /// Roll the world into the next season: counters reset, squads age,
    /// matchdays rewind. Fixtures for the new season arrive as their own
    /// `MatchScheduled` events.
    fn roll_over_season(&mut self) {
        self.season += 1;
        for league in self.leagues.values_mut() {
            league.current_matchday = 1;
        }
        for team in self.teams.values_mut() {
            team.record = pitchside_types::TeamRecord::default();
        }
        for player in self.players.values_mut() {
            player.yellow_cards = 0;
            player.red_cards = 0;
            player.age = player.age.saturating_add(1);
            player.set_fitness(100.0);
        }
    }
}
