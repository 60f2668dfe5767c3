//! Error types for the event log.

/// Errors raised by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A SQLite operation failed.
    #[error("store I/O error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// A record could not be serialized for appending.
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record failed to decode during replay. Fatal: the log
    /// is the source of truth and a corrupt prefix poisons everything
    /// after it.
    #[error("corrupt event record at sequence {sequence}: {detail}")]
    Corrupt {
        /// The offending sequence number.
        sequence: u64,
        /// What went wrong.
        detail: String,
    },

    /// Replay met an event kind this build does not know. Fatal in
    /// strict mode (the default) so log evolution stays explicit.
    #[error("unknown event kind '{kind}' at sequence {sequence}")]
    UnknownKind {
        /// The offending sequence number.
        sequence: u64,
        /// The unrecognized kind tag.
        kind: String,
    },
}
