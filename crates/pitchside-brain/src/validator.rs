//! The soft-state validator: the only gate between the collaborator
//! and the world.
//!
//! Nothing a collaborator says is trusted. Every proposal is checked
//! against the field allowlist, its target resolved, and its value
//! clamped into the declared range before it becomes a
//! `SoftStateUpdated` event. Anything else becomes a
//! `ValidationFailed` event -- never a crash, never a silent drop.
//! Out-of-range values are clamped *and* flagged, so the log records
//! that the collaborator tried to overshoot.
//!
//! Validation is pure: no RNG, no I/O, and the batch is processed in
//! stable `(target id, field)` order so replay is deterministic.

use chrono::{DateTime, Utc};
use tracing::debug;

use pitchside_types::{
    CollaboratorPhase, Event, EventPayload, MediaOutletId, OwnerId, PlayerId, ProposalBatch,
    SoftStateProposal, StaffId, TargetKind, TeamId,
};
use pitchside_world::World;

/// Maximum reputation movement per matchday.
pub const REPUTATION_DELTA_CAP: f64 = 5.0;

/// Fields that exist but are derived by the engine and may never be
/// written by a collaborator.
const DERIVED_ONLY_FIELDS: [&str; 2] = ["recent_form", "head_to_head"];

/// Validate a batch into events, in deterministic order.
///
/// Returns the `SoftStateUpdated` and `ValidationFailed` events for the
/// proposals (sorted by `(target id, field)`), followed by narrative
/// events for the surviving narratives.
pub fn validate_batch(
    world: &World,
    batch: &ProposalBatch,
    phase: CollaboratorPhase,
    timestamp: DateTime<Utc>,
) -> Vec<Event> {
    let mut proposals: Vec<&SoftStateProposal> = batch.proposals.iter().collect();
    proposals.sort_by(|a, b| {
        a.target_id
            .cmp(&b.target_id)
            .then_with(|| a.field.cmp(&b.field))
    });

    let mut events = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        events.extend(validate_proposal(world, proposal, phase, timestamp));
    }

    let mut narratives: Vec<_> = batch.narratives.iter().collect();
    narratives.sort_by(|a, b| a.source_id.cmp(&b.source_id).then_with(|| a.text.cmp(&b.text)));
    for narrative in narratives {
        events.push(validate_narrative(world, narrative, timestamp));
    }

    debug!(events = events.len(), "validated collaborator batch");
    events
}

/// The range and clamping class of an allowlisted field.
enum FieldRule {
    /// Plain `[0, 100]` percentage.
    Percent,
    /// Reputation: `[1, 100]` plus the per-matchday delta cap around
    /// the current value.
    Reputation { current: f64 },
}

fn rejection(
    proposal: &SoftStateProposal,
    reason: impl Into<String>,
    timestamp: DateTime<Utc>,
) -> Event {
    Event::new(
        timestamp,
        EventPayload::ValidationFailed {
            target_kind: proposal.target_kind.as_str().to_owned(),
            target_id: proposal.target_id.clone(),
            field: proposal.field.clone(),
            reason: reason.into(),
        },
    )
}

fn validate_proposal(
    world: &World,
    proposal: &SoftStateProposal,
    phase: CollaboratorPhase,
    timestamp: DateTime<Utc>,
) -> Vec<Event> {
    if DERIVED_ONLY_FIELDS.contains(&proposal.field.as_str()) {
        return vec![rejection(proposal, "field is derived-only", timestamp)];
    }

    let rule = match field_rule(world, proposal) {
        Ok(rule) => rule,
        Err(reason) => return vec![rejection(proposal, reason, timestamp)],
    };

    let Some(raw) = proposal.value.as_f64().filter(|v| v.is_finite()) else {
        return vec![rejection(proposal, "value is not a finite number", timestamp)];
    };

    let (clamped, overshot) = match rule {
        FieldRule::Percent => {
            let clamped = raw.clamp(0.0, 100.0);
            (clamped, clamped != raw)
        }
        FieldRule::Reputation { current } => {
            let capped = raw.clamp(
                current - REPUTATION_DELTA_CAP,
                current + REPUTATION_DELTA_CAP,
            );
            let clamped = capped.clamp(1.0, 100.0);
            (clamped, clamped != raw)
        }
    };

    let mut events = Vec::with_capacity(2);
    events.push(Event::new(
        timestamp,
        EventPayload::SoftStateUpdated {
            target_kind: proposal.target_kind.as_str().to_owned(),
            target_id: proposal.target_id.clone(),
            field: proposal.field.clone(),
            value: clamped,
            phase,
        },
    ));
    if overshot {
        events.push(rejection(
            proposal,
            format!("value {raw} out of range, clamped to {clamped}"),
            timestamp,
        ));
    }
    events
}

/// Resolve the target and look up the field's rule, or explain why not.
fn field_rule(world: &World, proposal: &SoftStateProposal) -> Result<FieldRule, String> {
    match proposal.target_kind {
        TargetKind::Player => {
            let player = world
                .players
                .get(&PlayerId::new(proposal.target_id.as_str()))
                .ok_or_else(|| format!("unknown player: {}", proposal.target_id))?;
            match proposal.field.as_str() {
                "form" | "morale" | "fitness" => Ok(FieldRule::Percent),
                "reputation" => Ok(FieldRule::Reputation {
                    current: f64::from(player.reputation),
                }),
                other => Err(format!("unknown player field: {other}")),
            }
        }
        TargetKind::Team => {
            let team = world
                .teams
                .get(&TeamId::new(proposal.target_id.as_str()))
                .ok_or_else(|| format!("unknown team: {}", proposal.target_id))?;
            match proposal.field.as_str() {
                "team_morale" | "tactical_familiarity" => Ok(FieldRule::Percent),
                "reputation" => Ok(FieldRule::Reputation {
                    current: f64::from(team.reputation),
                }),
                other => Err(format!("unknown team field: {other}")),
            }
        }
        TargetKind::Owner => {
            world
                .owners
                .get(&OwnerId::new(proposal.target_id.as_str()))
                .ok_or_else(|| format!("unknown owner: {}", proposal.target_id))?;
            match proposal.field.as_str() {
                "public_approval" => Ok(FieldRule::Percent),
                other => Err(format!("unknown owner field: {other}")),
            }
        }
        TargetKind::Staff => {
            world
                .staff
                .get(&StaffId::new(proposal.target_id.as_str()))
                .ok_or_else(|| format!("unknown staff member: {}", proposal.target_id))?;
            match proposal.field.as_str() {
                "team_rapport" => Ok(FieldRule::Percent),
                other => Err(format!("unknown staff field: {other}")),
            }
        }
    }
}

fn validate_narrative(
    world: &World,
    narrative: &pitchside_types::NarrativeProposal,
    timestamp: DateTime<Utc>,
) -> Event {
    let failed = |reason: String| {
        Event::new(
            timestamp,
            EventPayload::ValidationFailed {
                target_kind: narrative.source_kind.clone(),
                target_id: narrative.source_id.clone(),
                field: String::from("narrative"),
                reason,
            },
        )
    };

    match narrative.source_kind.as_str() {
        "media" => {
            let outlet_id = MediaOutletId::new(narrative.source_id.as_str());
            if !world.media_outlets.contains_key(&outlet_id) {
                return failed(format!("unknown media outlet: {}", narrative.source_id));
            }
            Event::new(
                timestamp,
                EventPayload::MediaStoryPublished {
                    outlet_id,
                    headline: narrative.text.clone(),
                    story_type: narrative.story_type.clone(),
                    entities_mentioned: narrative.entities_mentioned.clone(),
                    sentiment: narrative.sentiment,
                },
            )
        }
        "owner" => {
            let owner_id = OwnerId::new(narrative.source_id.as_str());
            match world.owners.get(&owner_id) {
                Some(owner) => Event::new(
                    timestamp,
                    EventPayload::OwnerStatementIssued {
                        owner_id,
                        team_id: owner.team_id.clone(),
                        statement: narrative.text.clone(),
                        sentiment: narrative.sentiment,
                    },
                ),
                None => failed(format!("unknown owner: {}", narrative.source_id)),
            }
        }
        other => failed(format!("unknown narrative source kind: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pitchside_types::Sentiment;
    use pitchside_world::create_world;

    fn world() -> World {
        create_world(42, chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 8, 18, 0, 0).unwrap()
    }

    fn proposal(kind: TargetKind, id: &str, field: &str, value: serde_json::Value) -> ProposalBatch {
        ProposalBatch {
            proposals: vec![SoftStateProposal {
                target_kind: kind,
                target_id: id.to_owned(),
                field: field.to_owned(),
                value,
                reasoning: None,
            }],
            narratives: vec![],
        }
    }

    fn first_player(world: &World) -> String {
        world.players.keys().next().unwrap().to_string()
    }

    #[test]
    fn overshoot_clamps_and_flags() {
        let world = world();
        let target = first_player(&world);
        let batch = proposal(TargetKind::Player, &target, "form", serde_json::json!(999));
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());

        assert_eq!(events.len(), 2);
        match &events[0].payload {
            EventPayload::SoftStateUpdated { value, field, .. } => {
                assert_eq!(*value, 100.0);
                assert_eq!(field, "form");
            }
            other => panic!("expected SoftStateUpdated, got {other:?}"),
        }
        assert!(matches!(
            events[1].payload,
            EventPayload::ValidationFailed { .. }
        ));
    }

    #[test]
    fn in_range_value_passes_clean() {
        let world = world();
        let target = first_player(&world);
        let batch = proposal(TargetKind::Player, &target, "morale", serde_json::json!(72));
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::SoftStateUpdated { value: 72.0, .. }
        ));
    }

    #[test]
    fn derived_fields_are_rejected() {
        let world = world();
        let team = world.teams.keys().next().unwrap().to_string();
        for field in ["recent_form", "head_to_head"] {
            let batch = proposal(TargetKind::Team, &team, field, serde_json::json!(5));
            let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
            assert_eq!(events.len(), 1);
            assert!(matches!(
                events[0].payload,
                EventPayload::ValidationFailed { .. }
            ));
        }
    }

    #[test]
    fn unknown_target_is_rejected() {
        let world = world();
        let batch = proposal(TargetKind::Player, "nobody", "form", serde_json::json!(50));
        let events = validate_batch(&world, &batch, CollaboratorPhase::PreMatch, ts());
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            EventPayload::ValidationFailed { reason, .. } => {
                assert!(reason.contains("unknown player"));
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let world = world();
        let target = first_player(&world);
        let batch = proposal(TargetKind::Player, &target, "salary", serde_json::json!(50));
        let events = validate_batch(&world, &batch, CollaboratorPhase::PreMatch, ts());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::ValidationFailed { .. }
        ));
    }

    #[test]
    fn reputation_delta_is_capped() {
        let world = world();
        let (team_id, team) = world.teams.iter().next().unwrap();
        let current = f64::from(team.reputation);
        let batch = proposal(
            TargetKind::Team,
            team_id.as_str(),
            "reputation",
            serde_json::json!(current + 40.0),
        );
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        match &events[0].payload {
            EventPayload::SoftStateUpdated { value, .. } => {
                assert_eq!(*value, (current + REPUTATION_DELTA_CAP).min(100.0));
            }
            other => panic!("expected SoftStateUpdated, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let world = world();
        let target = first_player(&world);
        let batch = proposal(
            TargetKind::Player,
            &target,
            "form",
            serde_json::json!("very high"),
        );
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::ValidationFailed { .. }
        ));
    }

    #[test]
    fn batch_order_is_stable() {
        let world = world();
        let mut ids: Vec<String> = world.players.keys().take(3).map(ToString::to_string).collect();
        ids.reverse();
        let batch = ProposalBatch {
            proposals: ids
                .iter()
                .map(|id| SoftStateProposal {
                    target_kind: TargetKind::Player,
                    target_id: id.clone(),
                    field: String::from("form"),
                    value: serde_json::json!(60),
                    reasoning: None,
                })
                .collect(),
            narratives: vec![],
        };
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        let emitted: Vec<String> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::SoftStateUpdated { target_id, .. } => Some(target_id.clone()),
                _ => None,
            })
            .collect();
        let mut sorted = emitted.clone();
        sorted.sort();
        assert_eq!(emitted, sorted);
    }

    #[test]
    fn media_narrative_publishes() {
        let world = world();
        let outlet = world.media_outlets.keys().next().unwrap().to_string();
        let batch = ProposalBatch {
            proposals: vec![],
            narratives: vec![pitchside_types::NarrativeProposal {
                source_id: outlet,
                source_kind: String::from("media"),
                text: String::from("Dragons roar back"),
                story_type: String::from("match_report"),
                entities_mentioned: vec![],
                sentiment: Sentiment::Positive,
            }],
        };
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::MediaStoryPublished { .. }
        ));
    }

    #[test]
    fn unknown_narrative_source_fails_validation() {
        let world = world();
        let batch = ProposalBatch {
            proposals: vec![],
            narratives: vec![pitchside_types::NarrativeProposal {
                source_id: String::from("ghost_gazette"),
                source_kind: String::from("media"),
                text: String::from("..."),
                story_type: String::from("gossip"),
                entities_mentioned: vec![],
                sentiment: Sentiment::Negative,
            }],
        };
        let events = validate_batch(&world, &batch, CollaboratorPhase::PostMatch, ts());
        assert!(matches!(
            events[0].payload,
            EventPayload::ValidationFailed { .. }
        ));
    }
}
