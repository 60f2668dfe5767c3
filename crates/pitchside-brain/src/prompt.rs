//! Prompt rendering for HTTP collaborators.
//!
//! Templates are rendered with `minijinja` over the serialized
//! [`MatchdayContext`]. The system prompt pins the output contract
//! (strict JSON, absolute values, known fields only); the user prompt
//! carries the matchday data.

use minijinja::Environment;
use pitchside_types::CollaboratorPhase;

use crate::context::MatchdayContext;
use crate::error::BrainError;

/// A fully rendered prompt pair.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System instructions.
    pub system: String,
    /// User payload.
    pub user: String,
}

const SYSTEM_TEMPLATE: &str = r#"You are the narrative brain of a football league simulation.
You adjust SOFT STATE only: player form/morale/fitness/reputation, team
team_morale/tactical_familiarity/reputation, owner public_approval, staff
team_rapport. You never change scores, cards, or statistics.

Respond with STRICT JSON, no prose, in this shape:
{
  "proposals": [
    {"target_kind": "player", "target_id": "<id>", "field": "form",
     "value": 64, "reasoning": "<short>"}
  ],
  "narratives": [
    {"source_kind": "media", "source_id": "<outlet id>",
     "text": "<headline>", "story_type": "match_report",
     "entities_mentioned": ["<id>"], "sentiment": "positive"}
  ]
}

Values are ABSOLUTE new values, not deltas. Fields outside the list
above will be rejected. Keep proposals modest and grounded in the data.
"#;

const USER_TEMPLATE: &str = r#"Season {{ season }}, {{ date }} — {{ phase }} review.

{% for league in leagues -%}
League: {{ league.name }} (matchday {{ league.matchday }})
{% for line in league.table -%}
  {{ line.position }}. {{ line.name }} — {{ line.points }} pts (morale {{ line.team_morale }})
{% endfor %}
{% endfor -%}
{% if results -%}
Results:
{% for r in results -%}
  {{ r.home_name }} {{ r.home_score }} - {{ r.away_score }} {{ r.away_name }} [{{ r.importance }}]
{% for s in r.scorers %}    scorer: {{ s.name }} ({{ s.id }}, form {{ s.form }})
{% endfor -%}
{% for s in r.sent_off %}    sent off: {{ s.name }} ({{ s.id }}, morale {{ s.morale }})
{% endfor -%}
{% endfor %}
{% endif -%}
{% if fixtures -%}
Upcoming fixtures:
{% for f in fixtures -%}
  {{ f.home_name }} vs {{ f.away_name }} [{{ f.importance }}]
{% endfor %}
{% endif -%}
Media outlets available: {% for o in outlets %}{{ o.id }}{% if not loop.last %}, {% endif %}{% endfor %}

Propose soft-state adjustments and optional narratives as JSON.
"#;

/// Render the prompt pair for a context.
///
/// # Errors
///
/// Returns [`BrainError::Template`] when rendering fails.
pub fn render(context: &MatchdayContext) -> Result<RenderedPrompt, BrainError> {
    let mut env = Environment::new();
    env.add_template("user", USER_TEMPLATE)?;
    let template = env.get_template("user")?;

    let phase = match context.phase {
        CollaboratorPhase::PreMatch => "pre-match",
        CollaboratorPhase::PostMatch => "post-match",
    };

    let user = template.render(minijinja::context! {
        phase => phase,
        season => context.season,
        date => context.date,
        leagues => context.leagues,
        fixtures => context.fixtures,
        results => context.results,
        outlets => context.outlets,
    })?;

    Ok(RenderedPrompt {
        system: SYSTEM_TEMPLATE.to_owned(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_types::{LeagueId, MediaOutletId, TeamId};

    fn minimal_context() -> MatchdayContext {
        MatchdayContext {
            phase: CollaboratorPhase::PostMatch,
            season: 1,
            date: String::from("2025-08-08"),
            leagues: vec![crate::context::LeagueContext {
                league_id: LeagueId::new("premier_fantasy"),
                name: String::from("Premier Fantasy League"),
                matchday: 2,
                table: vec![crate::context::TableLine {
                    position: 1,
                    team_id: TeamId::new("united_dragons"),
                    name: String::from("United Dragons"),
                    points: 3,
                    team_morale: 60,
                    owner_id: None,
                }],
            }],
            fixtures: vec![],
            results: vec![],
            outlets: vec![crate::context::OutletRef {
                id: MediaOutletId::new("pitchside_wire"),
                name: String::from("Pitchside Wire"),
            }],
        }
    }

    #[test]
    fn renders_league_and_outlets() {
        let prompt = render(&minimal_context()).expect("render");
        assert!(prompt.user.contains("Premier Fantasy League"));
        assert!(prompt.user.contains("United Dragons"));
        assert!(prompt.user.contains("pitchside_wire"));
        assert!(prompt.user.contains("post-match"));
        assert!(prompt.system.contains("STRICT JSON"));
    }
}
