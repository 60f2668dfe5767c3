//! Error types for the world aggregate.

/// Errors raised while querying or mutating the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A league id could not be resolved.
    #[error("unknown league: {0}")]
    UnknownLeague(String),

    /// A team id could not be resolved.
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    /// A player id could not be resolved.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// A match id could not be resolved.
    #[error("unknown match: {0}")]
    UnknownMatch(String),

    /// An event attempted to seal an already-finished match.
    #[error("match already finished: {0}")]
    MatchAlreadyFinished(String),

    /// The world reached a state that violates a declared invariant.
    #[error("world invariant violated: {0}")]
    InvariantViolation(String),
}
