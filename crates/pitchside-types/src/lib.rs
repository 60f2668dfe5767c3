//! Shared type definitions for the Pitchside league simulator.
//!
//! This crate is the single source of truth for the types used across
//! the workspace. It is pure data: no I/O, no RNG, no async.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string-id wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (positions, weather, severities)
//! - [`entities`] -- Core entity structs (players, teams, leagues, matches)
//! - [`events`] -- The tagged event union and match statistics
//! - [`proposals`] -- Soft-state proposal contract for the collaborator

pub mod entities;
pub mod enums;
pub mod events;
pub mod ids;
pub mod proposals;

// Re-export the public vocabulary at crate root for convenience.
pub use entities::{
    clamp_percent, clamp_reputation, Award, Finances, HeadToHead, InjuryRecord, League, Match,
    MediaOutlet, Owner, Player, SeasonStats, Stadium, StaffMember, Team, TeamRecord,
    RECENT_FORM_CAP,
};
pub use enums::{
    CollaboratorPhase, FixtureImportance, FormResult, FoulSeverity, FreeKickKind,
    FreeKickLocation, InjurySeverity, Position, PreferredFoot, Sentiment, Weather, WorkRate,
};
pub use events::{Event, EventPayload, MatchStats, TeamMatchStats};
pub use ids::{LeagueId, MatchId, MediaOutletId, OwnerId, PlayerId, StaffId, TeamId};
pub use proposals::{NarrativeProposal, ProposalBatch, SoftStateProposal, TargetKind};
