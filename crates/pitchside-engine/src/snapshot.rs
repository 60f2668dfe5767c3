//! Immutable input snapshots for the match engine.
//!
//! The engine never touches the world: the orchestrator takes read-only
//! snapshots of both teams (available players only) and hands them to a
//! worker together with a derived seed. Workers share no mutable state.

use chrono::{DateTime, Utc};
use pitchside_types::{MatchId, Player, PlayerId, Position, Team, TeamId, Weather};

/// The slice of a player the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// Display name (for commentary).
    pub name: String,
    /// Position.
    pub position: Position,
    /// Pace.
    pub pace: u8,
    /// Shooting.
    pub shooting: u8,
    /// Passing.
    pub passing: u8,
    /// Defending.
    pub defending: u8,
    /// Physicality.
    pub physicality: u8,
    /// Overall rating (derived in the domain model).
    pub overall: u8,
    /// Current form.
    pub form: u8,
    /// Current morale.
    pub morale: u8,
    /// Fitness at kick-off.
    pub fitness: u8,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            position: player.position,
            pace: player.pace,
            shooting: player.shooting,
            passing: player.passing,
            defending: player.defending,
            physicality: player.physicality,
            overall: player.overall_rating(),
            form: player.form,
            morale: player.morale,
            fitness: player.fitness,
        }
    }
}

/// The slice of a team the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSnapshot {
    /// Team id.
    pub id: TeamId,
    /// Display name (for commentary).
    pub name: String,
    /// Available players, sorted by id for deterministic iteration.
    pub players: Vec<PlayerSnapshot>,
}

impl TeamSnapshot {
    /// Build a snapshot from a team and its *available* players.
    ///
    /// Players are sorted by id so every downstream weighted choice sees
    /// candidates in a canonical order.
    pub fn new(team: &Team, available_players: &[&Player]) -> Self {
        let mut players: Vec<PlayerSnapshot> =
            available_players.iter().map(|p| PlayerSnapshot::from(*p)).collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            id: team.id.clone(),
            name: team.name.clone(),
            players,
        }
    }
}

/// Everything one match simulation consumes.
#[derive(Debug, Clone)]
pub struct MatchInput {
    /// The match being simulated.
    pub match_id: MatchId,
    /// Home team snapshot.
    pub home: TeamSnapshot,
    /// Away team snapshot.
    pub away: TeamSnapshot,
    /// Seed derived from `(world.seed, match.id)`.
    pub seed: u64,
    /// Weather fixed at scheduling.
    pub weather: Weather,
    /// Logical kick-off instant; every event timestamp offsets from it.
    pub kickoff: DateTime<Utc>,
}
