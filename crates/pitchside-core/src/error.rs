//! Error types for the orchestration layer.

/// Errors raised by the scheduler and orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The event log failed.
    #[error("store error: {0}")]
    Store(#[from] pitchside_store::StoreError),

    /// A world operation failed.
    #[error("world error: {0}")]
    World(#[from] pitchside_world::WorldError),

    /// The log is non-empty but does not begin with `WorldInitialized`,
    /// so the world cannot be rebuilt.
    #[error("event log has no genesis record; cannot rebuild the world")]
    MissingGenesis,

    /// A league cannot be scheduled (too few teams, odd membership).
    #[error("cannot schedule league {league}: {reason}")]
    Unschedulable {
        /// The league that failed.
        league: String,
        /// What was wrong.
        reason: String,
    },
}
