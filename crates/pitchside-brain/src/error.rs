//! Error types for the collaborator layer.

/// Errors raised while talking to or interpreting the collaborator.
#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    /// The HTTP backend call failed or returned a non-success status.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// The response could not be parsed into proposals.
    #[error("response parse error: {0}")]
    Parse(String),

    /// A prompt template failed to render.
    #[error("prompt render error: {0}")]
    Template(#[from] minijinja::Error),

    /// A required environment variable is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}
