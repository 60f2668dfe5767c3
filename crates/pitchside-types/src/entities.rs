//! Core entity structs for the league world.
//!
//! Entities are plain data owned by the world aggregate. They carry no
//! references to each other -- every relation is a stable string id.
//! Mutation happens only through `apply(event)` in the world crate;
//! the invariant-preserving helpers here (clamped setters, counter
//! updates) are the only mutating surface entities expose.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{
    FixtureImportance, FormResult, Position, PreferredFoot, Weather, WorkRate,
};
use crate::ids::{LeagueId, MatchId, MediaOutletId, OwnerId, PlayerId, StaffId, TeamId};

/// Maximum entries kept in a team's recent-form FIFO.
pub const RECENT_FORM_CAP: usize = 5;

/// Clamp a soft-state value into `[0, 100]`.
pub fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

/// Clamp a reputation value into `[1, 100]`.
pub fn clamp_reputation(value: f64) -> u8 {
    value.clamp(1.0, 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Per-season aggregate statistics for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    /// Matches appeared in.
    pub appearances: u32,
    /// Goals scored.
    pub goals: u32,
    /// Assists provided.
    pub assists: u32,
    /// Yellow cards received.
    pub yellows: u32,
    /// Red cards received.
    pub reds: u32,
    /// Minutes played.
    pub minutes: u32,
    /// Mean match rating across appearances.
    pub avg_rating: f32,
}

impl SeasonStats {
    /// Fold one more match rating into the running average.
    pub fn record_rating(&mut self, rating: f32) {
        let n = self.appearances.max(1) as f32;
        self.avg_rating = (self.avg_rating * (n - 1.0) + rating) / n;
    }
}

/// A past injury, kept for the player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryRecord {
    /// Season the injury happened in.
    pub season: u32,
    /// Human-readable description (e.g. "Hamstring pull").
    pub description: String,
    /// Weeks the player was ruled out.
    pub weeks_out: u32,
}

/// An end-of-season award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    /// Season the award was won.
    pub season: u32,
    /// Award title (e.g. "Golden Boot").
    pub title: String,
}

/// A football player.
///
/// The five core attributes and `overall_rating` are hard state set at
/// genesis. `form`, `morale` and `fitness` are soft state: the
/// collaborator proposes changes and the engine drifts them after
/// matches, always through clamped setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Team the player belongs to.
    pub team_id: TeamId,
    /// On-pitch position.
    pub position: Position,
    /// Age in years.
    pub age: u8,

    /// Pace, in `[1, 99]`.
    pub pace: u8,
    /// Shooting, in `[1, 99]`.
    pub shooting: u8,
    /// Passing, in `[1, 99]`.
    pub passing: u8,
    /// Defending, in `[1, 99]`.
    pub defending: u8,
    /// Physicality, in `[1, 99]`.
    pub physicality: u8,

    /// Current form, `[0, 100]`.
    pub form: u8,
    /// Morale, `[0, 100]`.
    pub morale: u8,
    /// Physical fitness, `[0, 100]`.
    pub fitness: u8,
    /// Reputation, `[1, 100]`.
    pub reputation: u8,
    /// Ceiling the player can still grow to. Never below `overall_rating`.
    pub potential: u8,

    /// Preferred foot.
    pub preferred_foot: PreferredFoot,
    /// Weak-foot ability, `[1, 5]`.
    pub weak_foot: u8,
    /// Skill moves, `[1, 5]`.
    pub skill_moves: u8,
    /// Named traits (e.g. "clinical_finisher").
    pub traits: BTreeSet<String>,
    /// Attacking work rate.
    pub attacking_work_rate: WorkRate,
    /// Defensive work rate.
    pub defensive_work_rate: WorkRate,

    /// Whether the player is currently injured.
    pub injured: bool,
    /// Weeks left before an injured player is available again.
    pub injury_weeks_remaining: u32,
    /// Whether the player is serving a suspension.
    pub suspended: bool,
    /// Matches left on the current suspension.
    pub suspension_matches_remaining: u32,
    /// Yellow cards in the current season.
    pub yellow_cards: u32,
    /// Red cards in the current season.
    pub red_cards: u32,

    /// Aggregates keyed by season.
    pub season_stats: BTreeMap<u32, SeasonStats>,
    /// All recorded injuries.
    pub injury_history: Vec<InjuryRecord>,
    /// Honours won.
    pub awards: Vec<Award>,
}

impl Player {
    /// Derived overall rating: position-weighted blend of the five core
    /// attributes.
    pub fn overall_rating(&self) -> u8 {
        let (pace, shoot, pass, def, phys) = (
            f64::from(self.pace),
            f64::from(self.shooting),
            f64::from(self.passing),
            f64::from(self.defending),
            f64::from(self.physicality),
        );
        let overall = match self.position {
            Position::GK => def * 0.5 + phys * 0.3 + pass * 0.2,
            Position::CB | Position::LB | Position::RB => {
                def * 0.5 + phys * 0.2 + pace * 0.2 + pass * 0.1
            }
            Position::CM | Position::LM | Position::RM => {
                pass * 0.4 + def * 0.2 + pace * 0.2 + shoot * 0.2
            }
            Position::CAM => pass * 0.35 + shoot * 0.35 + pace * 0.2 + phys * 0.1,
            Position::LW | Position::RW => pace * 0.35 + shoot * 0.3 + pass * 0.25 + phys * 0.1,
            Position::ST => shoot * 0.45 + pace * 0.25 + phys * 0.2 + pass * 0.1,
        };
        overall.round().clamp(1.0, 99.0) as u8
    }

    /// Whether the player can be picked for a starting eleven.
    pub fn is_available(&self) -> bool {
        !self.injured && !self.suspended
    }

    /// Set form, clamped to `[0, 100]`.
    pub fn set_form(&mut self, value: f64) {
        self.form = clamp_percent(value);
    }

    /// Set morale, clamped to `[0, 100]`.
    pub fn set_morale(&mut self, value: f64) {
        self.morale = clamp_percent(value);
    }

    /// Set fitness, clamped to `[0, 100]`.
    pub fn set_fitness(&mut self, value: f64) {
        self.fitness = clamp_percent(value);
    }

    /// Set reputation, clamped to `[1, 100]`.
    pub fn set_reputation(&mut self, value: f64) {
        self.reputation = clamp_reputation(value);
    }

    /// Season stats entry for `season`, created on first access.
    pub fn season_stats_mut(&mut self, season: u32) -> &mut SeasonStats {
        self.season_stats.entry(season).or_default()
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Home ground of a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stadium {
    /// Stadium name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
    /// Training-facility quality, `[1, 100]`.
    pub training_facilities: u8,
}

/// A team's financial position. Static in v1 beyond genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finances {
    /// Cash balance.
    pub balance: i64,
    /// Monthly running costs.
    pub monthly_costs: i64,
    /// Monthly revenue.
    pub monthly_revenue: i64,
}

/// Win/draw/loss tally against one opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    /// Wins against the opponent.
    pub wins: u32,
    /// Draws against the opponent.
    pub draws: u32,
    /// Losses against the opponent.
    pub losses: u32,
}

/// Season record counters for one team.
///
/// The arithmetic invariants (`points = 3*wins + draws`,
/// `matches_played = wins + draws + losses`) hold by construction:
/// the only mutation path is [`TeamRecord::record_result`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Matches played this season.
    pub matches_played: u32,
    /// Wins this season.
    pub wins: u32,
    /// Draws this season.
    pub draws: u32,
    /// Losses this season.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// Matches without conceding.
    pub clean_sheets: u32,
    /// Home wins / draws / losses.
    pub home: (u32, u32, u32),
    /// Away wins / draws / losses.
    pub away: (u32, u32, u32),
    /// Signed streak: positive = consecutive wins, negative = losses.
    pub current_streak: i32,
    /// Longest winning streak this season.
    pub longest_winning_streak: u32,
    /// Longest losing streak this season.
    pub longest_losing_streak: u32,
    /// FIFO of up to five most recent results, newest last.
    pub recent_form: VecDeque<FormResult>,
}

impl TeamRecord {
    /// League points: three per win, one per draw.
    pub fn points(&self) -> u32 {
        self.wins * 3 + self.draws
    }

    /// Goal difference. Negative when conceding more than scoring.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Fold one match result into the counters.
    pub fn record_result(&mut self, scored: u32, conceded: u32, at_home: bool) {
        self.matches_played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if conceded == 0 {
            self.clean_sheets += 1;
        }

        let result = if scored > conceded {
            FormResult::W
        } else if scored < conceded {
            FormResult::L
        } else {
            FormResult::D
        };

        let venue = if at_home { &mut self.home } else { &mut self.away };
        match result {
            FormResult::W => {
                self.wins += 1;
                venue.0 += 1;
                self.current_streak = if self.current_streak >= 0 {
                    self.current_streak + 1
                } else {
                    1
                };
                let streak = self.current_streak.unsigned_abs();
                if streak > self.longest_winning_streak {
                    self.longest_winning_streak = streak;
                }
            }
            FormResult::D => {
                self.draws += 1;
                venue.1 += 1;
                self.current_streak = 0;
            }
            FormResult::L => {
                self.losses += 1;
                venue.2 += 1;
                self.current_streak = if self.current_streak <= 0 {
                    self.current_streak - 1
                } else {
                    -1
                };
                let streak = self.current_streak.unsigned_abs();
                if streak > self.longest_losing_streak {
                    self.longest_losing_streak = streak;
                }
            }
        }

        self.recent_form.push_back(result);
        while self.recent_form.len() > RECENT_FORM_CAP {
            self.recent_form.pop_front();
        }
    }
}

/// A football club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Stable id.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// League membership.
    pub league_id: LeagueId,
    /// Squad, as player ids.
    pub squad: Vec<PlayerId>,
    /// Familiarity with the current tactical setup, `[0, 100]`.
    pub tactical_familiarity: u8,
    /// Collective morale, `[0, 100]`.
    pub team_morale: u8,
    /// Club reputation, `[1, 100]`.
    pub reputation: u8,
    /// Financial position.
    pub finances: Finances,
    /// Home ground.
    pub stadium: Stadium,
    /// This season's record counters.
    pub record: TeamRecord,
    /// All-time tally per opponent.
    pub head_to_head: BTreeMap<TeamId, HeadToHead>,
}

impl Team {
    /// Set team morale, clamped to `[0, 100]`.
    pub fn set_team_morale(&mut self, value: f64) {
        self.team_morale = clamp_percent(value);
    }

    /// Set tactical familiarity, clamped to `[0, 100]`.
    pub fn set_tactical_familiarity(&mut self, value: f64) {
        self.tactical_familiarity = clamp_percent(value);
    }

    /// Set reputation, clamped to `[1, 100]`.
    pub fn set_reputation(&mut self, value: f64) {
        self.reputation = clamp_reputation(value);
    }
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// A league of teams playing a double round-robin season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    /// Stable id.
    pub id: LeagueId,
    /// Display name.
    pub name: String,
    /// Member team ids.
    pub teams: Vec<TeamId>,
    /// Current matchday, `1..=total_matchdays`. One past the end when
    /// the season's fixtures are all played.
    pub current_matchday: u32,
    /// Total matchdays this season: `2 * (n - 1)` for `n` teams.
    pub total_matchdays: u32,
    /// Champion per completed season.
    pub champions_by_season: BTreeMap<u32, TeamId>,
    /// Top scorer per completed season.
    pub top_scorers_by_season: BTreeMap<u32, PlayerId>,
}

impl League {
    /// Whether every matchday of the current season has been played.
    pub fn is_season_complete(&self) -> bool {
        self.current_matchday > self.total_matchdays
    }
}

// ---------------------------------------------------------------------------
// Match & fixture
// ---------------------------------------------------------------------------

/// A scheduled or finished match.
///
/// Created unfinished by the scheduler; sealed exactly once by the
/// orchestrator when its `MatchEnded` event is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Stable, deterministic id.
    pub id: MatchId,
    /// League the match belongs to.
    pub league_id: LeagueId,
    /// Matchday within the season.
    pub matchday: u32,
    /// Season number.
    pub season: u32,
    /// Home team.
    pub home_team_id: TeamId,
    /// Away team.
    pub away_team_id: TeamId,
    /// Calendar date of the fixture.
    pub date: NaiveDate,
    /// Whether the result is sealed.
    pub finished: bool,
    /// Home goals. Meaningful only once finished.
    pub home_score: u32,
    /// Away goals. Meaningful only once finished.
    pub away_score: u32,
    /// Weather fixed at scheduling.
    pub weather: Weather,
    /// Attendance, at least 1000.
    pub attendance: u32,
    /// Atmosphere rating, `[30, 90]`.
    pub atmosphere_rating: u8,
    /// Importance classification at scheduling time.
    pub importance: FixtureImportance,
}

// ---------------------------------------------------------------------------
// Collateral entities
// ---------------------------------------------------------------------------

/// A club owner. `public_approval` is soft state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Stable id.
    pub id: OwnerId,
    /// Display name.
    pub name: String,
    /// Team owned.
    pub team_id: TeamId,
    /// Boardroom role (e.g. "Chairman").
    pub role: String,
    /// Supporter approval, `[0, 100]`.
    pub public_approval: u8,
}

impl Owner {
    /// Set public approval, clamped to `[0, 100]`.
    pub fn set_public_approval(&mut self, value: f64) {
        self.public_approval = clamp_percent(value);
    }
}

/// A member of a team's backroom staff. `team_rapport` is soft state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Stable id.
    pub id: StaffId,
    /// Display name.
    pub name: String,
    /// Team employed by.
    pub team_id: TeamId,
    /// Job title (e.g. "Head Coach").
    pub role: String,
    /// Rapport with the squad, `[0, 100]`.
    pub team_rapport: u8,
}

impl StaffMember {
    /// Set team rapport, clamped to `[0, 100]`.
    pub fn set_team_rapport(&mut self, value: f64) {
        self.team_rapport = clamp_percent(value);
    }
}

/// A media outlet producing narrative coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaOutlet {
    /// Stable id.
    pub id: MediaOutletId,
    /// Outlet name.
    pub name: String,
    /// Outlet style (e.g. "tabloid", "broadsheet").
    pub outlet_type: String,
    /// Recent headlines, newest last.
    pub active_stories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_after(results: &[(u32, u32, bool)]) -> TeamRecord {
        let mut record = TeamRecord::default();
        for &(scored, conceded, home) in results {
            record.record_result(scored, conceded, home);
        }
        record
    }

    #[test]
    fn record_arithmetic_holds() {
        let record = record_after(&[(2, 0, true), (1, 1, false), (0, 3, false), (4, 2, true)]);
        assert_eq!(record.matches_played, 4);
        assert_eq!(record.wins + record.draws + record.losses, 4);
        assert_eq!(record.points(), 3 * record.wins + record.draws);
        assert_eq!(record.goal_difference(), 7 - 6);
        assert_eq!(record.clean_sheets, 1);
    }

    #[test]
    fn recent_form_is_capped_at_five() {
        let record = record_after(&[
            (1, 0, true),
            (1, 0, true),
            (0, 0, true),
            (0, 1, false),
            (2, 0, false),
            (3, 1, true),
        ]);
        assert_eq!(record.recent_form.len(), RECENT_FORM_CAP);
        // Oldest result dropped; newest is last.
        assert_eq!(record.recent_form.back(), Some(&FormResult::W));
        assert_eq!(record.recent_form.front(), Some(&FormResult::D));
    }

    #[test]
    fn streaks_track_sign_and_length() {
        let record = record_after(&[(1, 0, true), (2, 0, true), (3, 0, true), (0, 1, false)]);
        assert_eq!(record.longest_winning_streak, 3);
        assert_eq!(record.current_streak, -1);
    }

    #[test]
    fn soft_setters_clamp() {
        let mut player = sample_player();
        player.set_form(250.0);
        assert_eq!(player.form, 100);
        player.set_form(-10.0);
        assert_eq!(player.form, 0);
        player.set_reputation(0.0);
        assert_eq!(player.reputation, 1);
    }

    fn sample_player() -> Player {
        Player {
            id: PlayerId::new("p1"),
            name: String::from("Test Player"),
            team_id: TeamId::new("t1"),
            position: Position::ST,
            age: 24,
            pace: 80,
            shooting: 85,
            passing: 70,
            defending: 35,
            physicality: 75,
            form: 50,
            morale: 50,
            fitness: 100,
            reputation: 60,
            potential: 90,
            preferred_foot: PreferredFoot::Right,
            weak_foot: 3,
            skill_moves: 4,
            traits: BTreeSet::new(),
            attacking_work_rate: WorkRate::High,
            defensive_work_rate: WorkRate::Low,
            injured: false,
            injury_weeks_remaining: 0,
            suspended: false,
            suspension_matches_remaining: 0,
            yellow_cards: 0,
            red_cards: 0,
            season_stats: BTreeMap::new(),
            injury_history: Vec::new(),
            awards: Vec::new(),
        }
    }

    #[test]
    fn overall_rating_weights_by_position() {
        let striker = sample_player();
        let mut keeper = sample_player();
        keeper.position = Position::GK;
        keeper.defending = 85;
        keeper.shooting = 20;
        assert!(striker.overall_rating() > 70);
        assert!(keeper.overall_rating() > 60);
    }
}
