//! The event vocabulary of the simulation.
//!
//! Every state change is an immutable [`Event`] appended to the durable
//! log. The in-memory world is a cache rebuilt by folding events over a
//! seeded genesis. Payloads form a tagged union; the `kind` tag is the
//! discriminator both in serialized form and in the store's `kind`
//! column.
//!
//! Timestamps are *logical*: derived from the world calendar and the
//! in-match minute, never from the wall clock, so two runs from the
//! same seed produce byte-identical logs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{
    CollaboratorPhase, FixtureImportance, FoulSeverity, FreeKickKind, FreeKickLocation,
    InjurySeverity, Sentiment, Weather,
};
use crate::ids::{LeagueId, MatchId, MediaOutletId, OwnerId, PlayerId, TeamId};

/// One side's share of a match's final statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMatchStats {
    /// Possession percentage. Home and away always sum to 100.
    pub possession: u8,
    /// Total shot attempts.
    pub shots: u32,
    /// Shots on target. Never below goals scored.
    pub shots_on_target: u32,
    /// Corner kicks taken.
    pub corners: u32,
    /// Fouls committed.
    pub fouls: u32,
    /// Offside calls against.
    pub offsides: u32,
    /// Free kicks awarded.
    pub free_kicks: u32,
    /// Penalties awarded.
    pub penalties_awarded: u32,
    /// Penalties converted.
    pub penalties_scored: u32,
    /// Yellow cards shown.
    pub yellow_cards: u32,
    /// Red cards shown.
    pub red_cards: u32,
}

/// Final statistics for both sides of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Home side statistics.
    pub home: TeamMatchStats,
    /// Away side statistics.
    pub away: TeamMatchStats,
}

/// An event with its logical timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Logical time the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The typed payload.
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Construct an event.
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self { timestamp, payload }
    }

    /// The payload's stable kind tag.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

/// The tagged union of every event payload.
///
/// Variants are serialized with an adjacent `kind` tag; the tag strings
/// are stable and form the store's forward-compatibility contract:
/// replaying a log containing an unknown tag is fatal in strict mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum EventPayload {
    /// The world was created from a seed.
    WorldInitialized {
        /// First season number.
        season: u32,
        /// The world seed every derived RNG descends from.
        seed: u64,
        /// Leagues present at genesis.
        leagues: Vec<LeagueId>,
    },

    /// A fixture entered the calendar.
    MatchScheduled {
        /// Deterministic match id.
        match_id: MatchId,
        /// League of the fixture.
        league_id: LeagueId,
        /// Matchday within the season.
        matchday: u32,
        /// Season number.
        season: u32,
        /// Home side.
        home_team_id: TeamId,
        /// Away side.
        away_team_id: TeamId,
        /// Calendar date.
        date: chrono::NaiveDate,
        /// Weather fixed at scheduling.
        weather: Weather,
        /// Expected attendance.
        attendance: u32,
        /// Atmosphere rating, `[30, 90]`.
        atmosphere_rating: u8,
        /// Importance classification.
        importance: FixtureImportance,
    },

    /// The engine began simulating a match.
    MatchStarted {
        /// The match.
        match_id: MatchId,
        /// Seed derived for this match's RNG, for observability.
        seed: u64,
    },

    /// Minute-zero kick-off.
    KickOff {
        /// The match.
        match_id: MatchId,
    },

    /// A goal was scored.
    Goal {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Scoring team.
        team_id: TeamId,
        /// The scorer.
        scorer: PlayerId,
        /// Assist provider, if any.
        assist: Option<PlayerId>,
        /// Whether the goal came from the penalty spot.
        penalty: bool,
        /// Home score after the goal.
        home_score: u32,
        /// Away score after the goal.
        away_score: u32,
    },

    /// A yellow card was shown.
    YellowCard {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Offending team.
        team_id: TeamId,
        /// Offending player.
        player: PlayerId,
        /// Referee's reason.
        reason: String,
    },

    /// A red card was shown.
    RedCard {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Offending team.
        team_id: TeamId,
        /// Offending player.
        player: PlayerId,
        /// Referee's reason.
        reason: String,
        /// Whether this was a second-yellow dismissal.
        second_yellow: bool,
    },

    /// A substitution was made.
    Substitution {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Substituting team.
        team_id: TeamId,
        /// Player leaving the pitch.
        player_off: PlayerId,
        /// Player coming on.
        player_on: PlayerId,
    },

    /// A player was injured during play.
    Injury {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// The player's team.
        team_id: TeamId,
        /// The injured player.
        player: PlayerId,
        /// Description (e.g. "Hamstring pull").
        description: String,
        /// Severity band.
        severity: InjurySeverity,
        /// Weeks ruled out.
        weeks_out: u32,
    },

    /// A corner kick was taken.
    CornerKick {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Attacking team.
        team_id: TeamId,
    },

    /// A foul was committed.
    Foul {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Fouling team.
        team_id: TeamId,
        /// Fouling player.
        player: PlayerId,
        /// Severity of the challenge.
        severity: FoulSeverity,
    },

    /// A free kick was awarded.
    FreeKick {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Team taking the kick.
        team_id: TeamId,
        /// Direct or indirect.
        free_kick_kind: FreeKickKind,
        /// Dangerous or safe territory.
        location: FreeKickLocation,
    },

    /// A penalty was awarded.
    PenaltyAwarded {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Team awarded the penalty.
        team_id: TeamId,
        /// Referee's reason.
        reason: String,
    },

    /// An attacker was flagged offside.
    Offside {
        /// The match.
        match_id: MatchId,
        /// Minute of play.
        minute: u8,
        /// Attacking team.
        team_id: TeamId,
        /// Flagged player.
        player: PlayerId,
    },

    /// A match finished. Exactly one per simulated match.
    MatchEnded {
        /// The match.
        match_id: MatchId,
        /// Home side.
        home_team_id: TeamId,
        /// Away side.
        away_team_id: TeamId,
        /// Final home score.
        home_score: u32,
        /// Final away score.
        away_score: u32,
        /// Aggregate statistics.
        stats: MatchStats,
        /// Human-readable commentary lines, in match order.
        commentary: Vec<String>,
        /// Final ratings for every fielded player, `[1.0, 10.0]`.
        player_ratings: BTreeMap<PlayerId, f32>,
    },

    /// A match was rolled back after a fatal engine error.
    MatchAborted {
        /// The match.
        match_id: MatchId,
        /// Engine error description.
        reason: String,
    },

    /// A validated soft-state change was applied.
    SoftStateUpdated {
        /// Entity kind ("player", "team", "owner", "staff").
        target_kind: String,
        /// Entity id.
        target_id: String,
        /// Field name.
        field: String,
        /// Value after clamping.
        value: f64,
        /// Collaborator phase the proposal arrived in.
        phase: CollaboratorPhase,
    },

    /// A collaborator proposal was rejected.
    ValidationFailed {
        /// Entity kind as proposed.
        target_kind: String,
        /// Entity id as proposed.
        target_id: String,
        /// Field name as proposed.
        field: String,
        /// Why the proposal was dropped.
        reason: String,
    },

    /// A head-to-head tally changed after a result.
    HeadToHeadUpdated {
        /// The team whose tally changed.
        team_id: TeamId,
        /// The opponent.
        opponent_id: TeamId,
        /// Wins against the opponent after the update.
        wins: u32,
        /// Draws after the update.
        draws: u32,
        /// Losses after the update.
        losses: u32,
    },

    /// A media outlet published a story.
    MediaStoryPublished {
        /// The outlet.
        outlet_id: MediaOutletId,
        /// Headline text.
        headline: String,
        /// Story category (e.g. "match_report").
        story_type: String,
        /// Entity ids mentioned.
        entities_mentioned: Vec<String>,
        /// Coverage sentiment.
        sentiment: Sentiment,
    },

    /// A club owner made a public statement.
    OwnerStatementIssued {
        /// The owner.
        owner_id: OwnerId,
        /// The owner's team.
        team_id: TeamId,
        /// Statement text.
        statement: String,
        /// Statement sentiment.
        sentiment: Sentiment,
    },

    /// A league's season concluded.
    SeasonEnded {
        /// The league.
        league_id: LeagueId,
        /// The season that ended.
        season: u32,
        /// The champion.
        champion: TeamId,
        /// Top scorer, if any goals were scored.
        top_scorer: Option<PlayerId>,
        /// Top assister, if any assists were made.
        top_assister: Option<PlayerId>,
        /// Team with the most clean sheets.
        most_clean_sheets: Option<TeamId>,
    },
}

impl EventPayload {
    /// Every kind tag this build understands, for replay compatibility
    /// checks. Keep in sync with the variant list.
    pub const KNOWN_KINDS: [&'static str; 22] = [
        "WorldInitialized",
        "MatchScheduled",
        "MatchStarted",
        "KickOff",
        "Goal",
        "YellowCard",
        "RedCard",
        "Substitution",
        "Injury",
        "CornerKick",
        "Foul",
        "FreeKick",
        "PenaltyAwarded",
        "Offside",
        "MatchEnded",
        "MatchAborted",
        "SoftStateUpdated",
        "ValidationFailed",
        "HeadToHeadUpdated",
        "MediaStoryPublished",
        "OwnerStatementIssued",
        "SeasonEnded",
    ];

    /// Whether a kind tag is one this build can decode.
    pub fn is_known_kind(kind: &str) -> bool {
        Self::KNOWN_KINDS.contains(&kind)
    }

    /// Stable kind tag, identical to the serialized discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WorldInitialized { .. } => "WorldInitialized",
            Self::MatchScheduled { .. } => "MatchScheduled",
            Self::MatchStarted { .. } => "MatchStarted",
            Self::KickOff { .. } => "KickOff",
            Self::Goal { .. } => "Goal",
            Self::YellowCard { .. } => "YellowCard",
            Self::RedCard { .. } => "RedCard",
            Self::Substitution { .. } => "Substitution",
            Self::Injury { .. } => "Injury",
            Self::CornerKick { .. } => "CornerKick",
            Self::Foul { .. } => "Foul",
            Self::FreeKick { .. } => "FreeKick",
            Self::PenaltyAwarded { .. } => "PenaltyAwarded",
            Self::Offside { .. } => "Offside",
            Self::MatchEnded { .. } => "MatchEnded",
            Self::MatchAborted { .. } => "MatchAborted",
            Self::SoftStateUpdated { .. } => "SoftStateUpdated",
            Self::ValidationFailed { .. } => "ValidationFailed",
            Self::HeadToHeadUpdated { .. } => "HeadToHeadUpdated",
            Self::MediaStoryPublished { .. } => "MediaStoryPublished",
            Self::OwnerStatementIssued { .. } => "OwnerStatementIssued",
            Self::SeasonEnded { .. } => "SeasonEnded",
        }
    }

    /// The match this payload belongs to, if it is a match event.
    pub fn match_id(&self) -> Option<&MatchId> {
        match self {
            Self::MatchScheduled { match_id, .. }
            | Self::MatchStarted { match_id, .. }
            | Self::KickOff { match_id, .. }
            | Self::Goal { match_id, .. }
            | Self::YellowCard { match_id, .. }
            | Self::RedCard { match_id, .. }
            | Self::Substitution { match_id, .. }
            | Self::Injury { match_id, .. }
            | Self::CornerKick { match_id, .. }
            | Self::Foul { match_id, .. }
            | Self::FreeKick { match_id, .. }
            | Self::PenaltyAwarded { match_id, .. }
            | Self::Offside { match_id, .. }
            | Self::MatchEnded { match_id, .. }
            | Self::MatchAborted { match_id, .. } => Some(match_id),
            _ => None,
        }
    }
}
