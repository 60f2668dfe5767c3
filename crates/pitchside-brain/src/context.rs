//! The read-only snapshot handed to the collaborator.
//!
//! The collaborator never sees the world itself -- only this flattened
//! context, which doubles as the template model for prompt rendering.
//! Everything in it is current soft state plus the matchday's fixtures
//! or results, so both the mock and a real LLM have what they need to
//! propose absolute new values.

use serde::{Deserialize, Serialize};

use pitchside_types::{
    CollaboratorPhase, FixtureImportance, LeagueId, MatchId, MediaOutletId, OwnerId, PlayerId,
    TeamId,
};

/// A player reference with its current soft state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Player id.
    pub id: PlayerId,
    /// Player name.
    pub name: String,
    /// Current form.
    pub form: u8,
    /// Current morale.
    pub morale: u8,
}

/// One line of a league table as the collaborator sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLine {
    /// 1-based position.
    pub position: u32,
    /// Team id.
    pub team_id: TeamId,
    /// Team name.
    pub name: String,
    /// League points.
    pub points: u32,
    /// Current team morale.
    pub team_morale: u8,
    /// The club's owner, if any.
    pub owner_id: Option<OwnerId>,
}

/// A league's standing within the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueContext {
    /// League id.
    pub league_id: LeagueId,
    /// League name.
    pub name: String,
    /// Current matchday.
    pub matchday: u32,
    /// The table, position order.
    pub table: Vec<TableLine>,
}

/// An upcoming fixture (pre-match phase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureContext {
    /// Match id.
    pub match_id: MatchId,
    /// Home team id.
    pub home_team_id: TeamId,
    /// Home team name.
    pub home_name: String,
    /// Away team id.
    pub away_team_id: TeamId,
    /// Away team name.
    pub away_name: String,
    /// Importance classification.
    pub importance: FixtureImportance,
}

/// A finished match (post-match phase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultContext {
    /// Match id.
    pub match_id: MatchId,
    /// Home team id.
    pub home_team_id: TeamId,
    /// Home team name.
    pub home_name: String,
    /// Away team id.
    pub away_team_id: TeamId,
    /// Away team name.
    pub away_name: String,
    /// Final home score.
    pub home_score: u32,
    /// Final away score.
    pub away_score: u32,
    /// Importance classification.
    pub importance: FixtureImportance,
    /// Goal scorers with current soft state.
    pub scorers: Vec<PlayerRef>,
    /// Players sent off.
    pub sent_off: Vec<PlayerRef>,
}

/// A media outlet the collaborator may publish through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletRef {
    /// Outlet id.
    pub id: MediaOutletId,
    /// Outlet name.
    pub name: String,
}

/// The complete context for one collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchdayContext {
    /// Which phase this invocation belongs to.
    pub phase: CollaboratorPhase,
    /// Current season.
    pub season: u32,
    /// Calendar date, ISO format.
    pub date: String,
    /// League standings.
    pub leagues: Vec<LeagueContext>,
    /// Upcoming fixtures (pre-match; empty post-match).
    pub fixtures: Vec<FixtureContext>,
    /// Finished matches (post-match; empty pre-match).
    pub results: Vec<ResultContext>,
    /// Available media outlets.
    pub outlets: Vec<OutletRef>,
}
