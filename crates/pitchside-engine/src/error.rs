//! Error types for the match engine.
//!
//! Engine errors are fatal to the match being simulated, never to the
//! process: the orchestrator rolls the match back and records a
//! `MatchAborted` event.

/// Errors raised while simulating a single match.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A starting eleven could not be formed from the available squad.
    #[error("cannot form a starting eleven for {team}: {reason}")]
    LineupInfeasible {
        /// The team that failed selection.
        team: String,
        /// What was missing.
        reason: String,
    },

    /// The match state machine was driven through an illegal transition.
    #[error("illegal match state transition: {from} -> {to}")]
    IllegalTransition {
        /// State before the attempted transition.
        from: &'static str,
        /// Attempted target state.
        to: &'static str,
    },
}
