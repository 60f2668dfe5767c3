//! Tolerant parsing of collaborator responses.
//!
//! The LLM returns raw text that should be JSON. Recovery strategies,
//! in order: direct parse, markdown code-block extraction, trailing
//! comma stripping, and the combination. A response that defeats all
//! of them yields an empty batch with a warning -- a malformed
//! collaborator must never take the matchday down.

use pitchside_types::ProposalBatch;
use tracing::warn;

use crate::error::BrainError;

/// Parse a raw response into a [`ProposalBatch`], empty on failure.
pub fn parse_response(raw: &str) -> ProposalBatch {
    match try_parse(raw) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, raw_response = raw, "unparseable collaborator response, proceeding with empty batch");
            ProposalBatch::default()
        }
    }
}

/// Attempt the recovery strategies in order.
fn try_parse(raw: &str) -> Result<ProposalBatch, BrainError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse.
    if let Ok(batch) = serde_json::from_str::<ProposalBatch>(trimmed) {
        return Ok(batch);
    }

    // Strategy 2: extract from a markdown code block.
    if let Some(inner) = extract_json_from_codeblock(trimmed) {
        if let Ok(batch) = serde_json::from_str::<ProposalBatch>(inner) {
            return Ok(batch);
        }
    }

    // Strategy 3: strip trailing commas and retry.
    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(batch) = serde_json::from_str::<ProposalBatch>(&cleaned) {
        return Ok(batch);
    }

    // Strategy 4: code block, then strip commas.
    if let Some(inner) = extract_json_from_codeblock(trimmed) {
        let cleaned = strip_trailing_commas(inner);
        if let Ok(batch) = serde_json::from_str::<ProposalBatch>(&cleaned) {
            return Ok(batch);
        }
    }

    Err(BrainError::Parse(format!(
        "all parse strategies failed for: {trimmed}"
    )))
}

/// Pull the contents out of the first ``` fence, tolerating a language
/// tag on the opening line.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Remove commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            // Look ahead past whitespace for a closer.
            let mut lookahead = chars.clone();
            let mut next_significant = None;
            for n in lookahead.by_ref() {
                if !n.is_whitespace() {
                    next_significant = Some(n);
                    break;
                }
            }
            if matches!(next_significant, Some('}' | ']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_types::TargetKind;

    const CLEAN: &str = r#"{"proposals":[{"target_kind":"player","target_id":"p1","field":"form","value":70}],"narratives":[]}"#;

    #[test]
    fn parses_clean_json() {
        let batch = parse_response(CLEAN);
        assert_eq!(batch.proposals.len(), 1);
        assert_eq!(batch.proposals[0].target_kind, TargetKind::Player);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("Here you go:\n```json\n{CLEAN}\n```\nHope that helps!");
        let batch = parse_response(&fenced);
        assert_eq!(batch.proposals.len(), 1);
    }

    #[test]
    fn strips_trailing_commas() {
        let sloppy = r#"{"proposals":[{"target_kind":"team","target_id":"t1","field":"team_morale","value":55,},],}"#;
        let batch = parse_response(sloppy);
        assert_eq!(batch.proposals.len(), 1);
    }

    #[test]
    fn garbage_yields_empty_batch() {
        let batch = parse_response("I am unable to help with that.");
        assert!(batch.proposals.is_empty());
        assert!(batch.narratives.is_empty());
    }
}
