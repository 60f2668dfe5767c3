//! Collaborator configuration from environment variables.
//!
//! Recognized variables:
//!
//! - `LLM_PROVIDER` -- `mock` (default), `openai`, or `anthropic`
//! - `LLM_API_URL` -- base API URL for HTTP providers
//! - `LLM_API_KEY` -- API key for HTTP providers
//! - `LLM_MODEL` -- model identifier
//! - `LLM_TEMPERATURE` -- sampling temperature (default 0.7)
//! - `LLM_MAX_TOKENS` -- response token cap (default 1000)
//! - `LLM_TIMEOUT_SECS` -- per-call timeout (default 30)
//!
//! Unknown variables are ignored. An unknown `LLM_PROVIDER` value falls
//! back to the mock with a warning rather than failing startup.

use std::time::Duration;

use tracing::warn;

use crate::error::BrainError;

/// Which collaborator implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Deterministic offline heuristics.
    Mock,
    /// OpenAI-compatible chat completions API (also LM Studio, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

/// Complete collaborator configuration.
#[derive(Debug, Clone)]
pub struct BrainConfig {
    /// Selected provider.
    pub provider: ProviderKind,
    /// Base API URL (HTTP providers).
    pub api_url: String,
    /// API key (HTTP providers).
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response token cap.
    pub max_tokens: u32,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            api_url: String::from("http://localhost:1234/v1"),
            api_key: String::new(),
            model: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BrainConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::Config`] when an HTTP provider is selected
    /// but its URL, key, or model is missing, or when a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, BrainError> {
        let mut config = Self::default();

        match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("openai") => config.provider = ProviderKind::OpenAi,
            Ok("anthropic") => config.provider = ProviderKind::Anthropic,
            Ok("mock") | Err(_) => config.provider = ProviderKind::Mock,
            Ok(other) => {
                warn!(provider = other, "unknown LLM_PROVIDER, falling back to mock");
                config.provider = ProviderKind::Mock;
            }
        }

        if let Ok(url) = std::env::var("LLM_API_URL") {
            config.api_url = url;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.api_key = key;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("LLM_TEMPERATURE") {
            config.temperature = raw
                .parse()
                .map_err(|_| BrainError::Config(format!("bad LLM_TEMPERATURE: {raw}")))?;
        }
        if let Ok(raw) = std::env::var("LLM_MAX_TOKENS") {
            config.max_tokens = raw
                .parse()
                .map_err(|_| BrainError::Config(format!("bad LLM_MAX_TOKENS: {raw}")))?;
        }
        if let Ok(raw) = std::env::var("LLM_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| BrainError::Config(format!("bad LLM_TIMEOUT_SECS: {raw}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        if config.provider != ProviderKind::Mock && config.model.is_empty() {
            return Err(BrainError::Config(String::from(
                "LLM_MODEL is required for HTTP providers",
            )));
        }

        Ok(config)
    }
}
