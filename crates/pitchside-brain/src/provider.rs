//! Collaborator backends and enum dispatch.
//!
//! Enum dispatch instead of trait objects: async methods are not
//! dyn-compatible, and there are exactly three implementations. The
//! orchestrator holds a [`Collaborator`] and calls
//! [`Collaborator::propose`] without caring which backend answers.

use tracing::info;

use pitchside_types::ProposalBatch;

use crate::config::{BrainConfig, ProviderKind};
use crate::context::MatchdayContext;
use crate::error::BrainError;
use crate::mock;
use crate::parse::parse_response;
use crate::prompt::{render, RenderedPrompt};

/// A soft-state collaborator.
pub enum Collaborator {
    /// Deterministic offline heuristics.
    Mock,
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl Collaborator {
    /// Build a collaborator from configuration.
    pub fn from_config(config: &BrainConfig) -> Self {
        match config.provider {
            ProviderKind::Mock => Self::Mock,
            ProviderKind::OpenAi => Self::OpenAi(OpenAiBackend::new(config)),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicBackend::new(config)),
        }
    }

    /// Produce soft-state proposals for a matchday context.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::Backend`] when an HTTP call fails. The
    /// mock never fails. Parse failures do not error: they degrade to
    /// an empty batch (the orchestrator logs a `ValidationFailed`).
    pub async fn propose(&self, context: &MatchdayContext) -> Result<ProposalBatch, BrainError> {
        match self {
            Self::Mock => Ok(mock::propose(context)),
            Self::OpenAi(backend) => {
                let prompt = render(context)?;
                let raw = backend.complete(&prompt).await?;
                Ok(parse_response(&raw))
            }
            Self::Anthropic(backend) => {
                let prompt = render(context)?;
                let raw = backend.complete(&prompt).await?;
                Ok(parse_response(&raw))
            }
        }
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs (OpenAI, LM
/// Studio, Ollama). Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// Create a backend from configuration.
    pub fn new(config: &BrainConfig) -> Self {
        info!(model = %config.model, "OpenAI-compatible collaborator configured");
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, BrainError> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainError::Backend(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(BrainError::Backend(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BrainError::Backend(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an OpenAI chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, BrainError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            BrainError::Backend(String::from(
                "OpenAI response missing choices[0].message.content",
            ))
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API. Uses `x-api-key` instead of
/// a bearer token, a top-level `system` field, and `content[0].text` in
/// the response.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// Create a backend from configuration.
    pub fn new(config: &BrainConfig) -> Self {
        info!(model = %config.model, "Anthropic collaborator configured");
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, BrainError> {
        let url = format!("{}/messages", self.api_url);
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainError::Backend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(BrainError::Backend(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BrainError::Backend(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, BrainError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| BrainError::Backend(String::from("Anthropic response missing content[0].text")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_openai_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": {"content": "{\"proposals\": []}"}
            }]
        });
        assert!(extract_openai_content(&json).is_ok());
    }

    #[test]
    fn extract_openai_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(extract_openai_content(&json).is_err());
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "{\"proposals\": []}"}]
        });
        assert!(extract_anthropic_content(&json).is_ok());
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn dispatch_names() {
        let config = BrainConfig::default();
        let collaborator = Collaborator::from_config(&config);
        assert_eq!(collaborator.name(), "mock");
    }
}
