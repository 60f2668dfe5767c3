//! Soft-state proposal types: the contract between the collaborator
//! and the validator.
//!
//! The external collaborator (an LLM, or a deterministic mock) returns
//! a batch of [`SoftStateProposal`] values. Nothing in a proposal is
//! trusted: the validator clamps values, rejects unknown targets and
//! fields, and turns the survivors into `SoftStateUpdated` events.

use serde::{Deserialize, Serialize};

use crate::enums::Sentiment;

/// The kind of entity a proposal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A player.
    Player,
    /// A team.
    Team,
    /// A club owner.
    Owner,
    /// A staff member.
    Staff,
}

impl TargetKind {
    /// Stable lowercase label used in events and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Team => "team",
            Self::Owner => "owner",
            Self::Staff => "staff",
        }
    }
}

/// One proposed soft-state adjustment.
///
/// `value` arrives as raw JSON because the collaborator is untrusted:
/// the validator decides whether it is a number in range for the named
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftStateProposal {
    /// Entity kind being targeted.
    pub target_kind: TargetKind,
    /// Entity id being targeted.
    pub target_id: String,
    /// Field to adjust (e.g. "form", "morale").
    pub field: String,
    /// Proposed new value.
    pub value: serde_json::Value,
    /// The collaborator's stated reasoning. Logged, never interpreted.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// A narrative item proposed by the collaborator alongside soft-state
/// changes. Published as `MediaStoryPublished` / `OwnerStatementIssued`
/// events after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeProposal {
    /// Who is speaking: a media outlet id or an owner id.
    pub source_id: String,
    /// "media" or "owner".
    pub source_kind: String,
    /// Headline or statement text.
    pub text: String,
    /// Story category (e.g. "match_report", "title_race").
    pub story_type: String,
    /// Entity ids mentioned.
    #[serde(default)]
    pub entities_mentioned: Vec<String>,
    /// Coverage sentiment.
    pub sentiment: Sentiment,
}

/// Everything a collaborator returns for one phase of one matchday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalBatch {
    /// Soft-state adjustments.
    #[serde(default)]
    pub proposals: Vec<SoftStateProposal>,
    /// Narrative items.
    #[serde(default)]
    pub narratives: Vec<NarrativeProposal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_deserializes_from_collaborator_json() {
        let raw = r#"{
            "target_kind": "player",
            "target_id": "united_dragons_st_1",
            "field": "form",
            "value": 72,
            "reasoning": "scored twice"
        }"#;
        let proposal: SoftStateProposal = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(proposal.target_kind, TargetKind::Player);
        assert_eq!(proposal.field, "form");
        assert_eq!(proposal.value, serde_json::json!(72));
    }

    #[test]
    fn batch_defaults_to_empty() {
        let batch: ProposalBatch = serde_json::from_str("{}").expect("deserialize");
        assert!(batch.proposals.is_empty());
        assert!(batch.narratives.is_empty());
    }
}
