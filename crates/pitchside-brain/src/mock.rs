//! The deterministic offline collaborator.
//!
//! A pure function of the matchday context, no RNG, no I/O: goal
//! scorers trend up, dismissed players trend down, table position moves
//! team morale, and lopsided results in flagged fixtures make
//! headlines. Useful for tests and for running without an LLM; it
//! satisfies the same contract as the HTTP providers.

use pitchside_types::{
    CollaboratorPhase, NarrativeProposal, ProposalBatch, Sentiment, SoftStateProposal, TargetKind,
};

use crate::context::MatchdayContext;

/// Form boost for scoring.
const SCORER_FORM_BOOST: f64 = 5.0;
/// Form penalty for a dismissal.
const RED_FORM_PENALTY: f64 = 10.0;
/// Morale penalty for a dismissal.
const RED_MORALE_PENALTY: f64 = 15.0;
/// Team-morale boost for the top three.
const TOP_TABLE_MORALE: f64 = 2.0;
/// Team-morale drop for the bottom three.
const BOTTOM_TABLE_MORALE: f64 = 3.0;

/// Produce the mock's proposals for a context.
pub fn propose(context: &MatchdayContext) -> ProposalBatch {
    let mut batch = ProposalBatch::default();
    if context.phase == CollaboratorPhase::PreMatch {
        // The mock saves its opinions for after the whistle.
        return batch;
    }

    for result in &context.results {
        for scorer in &result.scorers {
            batch.proposals.push(SoftStateProposal {
                target_kind: TargetKind::Player,
                target_id: scorer.id.to_string(),
                field: String::from("form"),
                value: serde_json::json!(f64::from(scorer.form) + SCORER_FORM_BOOST),
                reasoning: Some(format!("scored in {} vs {}", result.home_name, result.away_name)),
            });
        }
        for dismissed in &result.sent_off {
            batch.proposals.push(SoftStateProposal {
                target_kind: TargetKind::Player,
                target_id: dismissed.id.to_string(),
                field: String::from("form"),
                value: serde_json::json!(f64::from(dismissed.form) - RED_FORM_PENALTY),
                reasoning: Some(String::from("sent off")),
            });
            batch.proposals.push(SoftStateProposal {
                target_kind: TargetKind::Player,
                target_id: dismissed.id.to_string(),
                field: String::from("morale"),
                value: serde_json::json!(f64::from(dismissed.morale) - RED_MORALE_PENALTY),
                reasoning: Some(String::from("sent off")),
            });
        }

        // Flagged fixtures with a clear result make a headline.
        let margin = result.home_score.abs_diff(result.away_score);
        if result.importance != pitchside_types::FixtureImportance::Normal && margin >= 2 {
            if let Some(outlet) = context.outlets.first() {
                let (winner, loser) = if result.home_score > result.away_score {
                    (&result.home_name, &result.away_name)
                } else {
                    (&result.away_name, &result.home_name)
                };
                batch.narratives.push(NarrativeProposal {
                    source_id: outlet.id.to_string(),
                    source_kind: String::from("media"),
                    text: format!(
                        "{winner} sweep {loser} aside {}-{}",
                        result.home_score.max(result.away_score),
                        result.home_score.min(result.away_score)
                    ),
                    story_type: String::from("match_report"),
                    entities_mentioned: vec![
                        result.home_team_id.to_string(),
                        result.away_team_id.to_string(),
                    ],
                    sentiment: Sentiment::Positive,
                });
            }
        }
    }

    for league in &context.leagues {
        let table_len = league.table.len();
        for line in &league.table {
            if line.position <= 3 {
                batch.proposals.push(SoftStateProposal {
                    target_kind: TargetKind::Team,
                    target_id: line.team_id.to_string(),
                    field: String::from("team_morale"),
                    value: serde_json::json!(f64::from(line.team_morale) + TOP_TABLE_MORALE),
                    reasoning: Some(format!("top three at position {}", line.position)),
                });
            } else if line.position as usize + 3 > table_len {
                batch.proposals.push(SoftStateProposal {
                    target_kind: TargetKind::Team,
                    target_id: line.team_id.to_string(),
                    field: String::from("team_morale"),
                    value: serde_json::json!(f64::from(line.team_morale) - BOTTOM_TABLE_MORALE),
                    reasoning: Some(format!("bottom three at position {}", line.position)),
                });
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{LeagueContext, OutletRef, PlayerRef, ResultContext, TableLine};
    use pitchside_types::{
        FixtureImportance, LeagueId, MatchId, MediaOutletId, PlayerId, TeamId,
    };

    fn post_match_context() -> MatchdayContext {
        MatchdayContext {
            phase: CollaboratorPhase::PostMatch,
            season: 1,
            date: String::from("2025-08-08"),
            leagues: vec![LeagueContext {
                league_id: LeagueId::new("l1"),
                name: String::from("League One"),
                matchday: 1,
                table: (1..=6)
                    .map(|i| TableLine {
                        position: i,
                        team_id: TeamId::new(format!("t{i}")),
                        name: format!("Team {i}"),
                        points: 18 - i * 3,
                        team_morale: 50,
                        owner_id: None,
                    })
                    .collect(),
            }],
            fixtures: vec![],
            results: vec![ResultContext {
                match_id: MatchId::new("m1"),
                home_team_id: TeamId::new("t1"),
                home_name: String::from("Team 1"),
                away_team_id: TeamId::new("t2"),
                away_name: String::from("Team 2"),
                home_score: 3,
                away_score: 0,
                importance: FixtureImportance::Derby,
                scorers: vec![PlayerRef {
                    id: PlayerId::new("p9"),
                    name: String::from("Striker"),
                    form: 60,
                    morale: 55,
                }],
                sent_off: vec![PlayerRef {
                    id: PlayerId::new("p4"),
                    name: String::from("Enforcer"),
                    form: 50,
                    morale: 50,
                }],
            }],
            outlets: vec![OutletRef {
                id: MediaOutletId::new("wire"),
                name: String::from("Wire"),
            }],
        }
    }

    #[test]
    fn pre_match_is_quiet() {
        let mut context = post_match_context();
        context.phase = CollaboratorPhase::PreMatch;
        let batch = propose(&context);
        assert!(batch.proposals.is_empty());
        assert!(batch.narratives.is_empty());
    }

    #[test]
    fn scorers_trend_up_dismissals_down() {
        let batch = propose(&post_match_context());
        let scorer = batch
            .proposals
            .iter()
            .find(|p| p.target_id == "p9" && p.field == "form")
            .expect("scorer proposal");
        assert_eq!(scorer.value, serde_json::json!(65.0));

        let dismissed_morale = batch
            .proposals
            .iter()
            .find(|p| p.target_id == "p4" && p.field == "morale")
            .expect("dismissal proposal");
        assert_eq!(dismissed_morale.value, serde_json::json!(35.0));
    }

    #[test]
    fn derby_blowout_makes_headlines() {
        let batch = propose(&post_match_context());
        assert_eq!(batch.narratives.len(), 1);
        assert!(batch.narratives[0].text.contains("Team 1"));
    }

    #[test]
    fn table_extremes_move_team_morale() {
        let batch = propose(&post_match_context());
        let boosts = batch
            .proposals
            .iter()
            .filter(|p| p.target_kind == TargetKind::Team)
            .count();
        // Top three plus bottom three of a six-team table.
        assert_eq!(boosts, 6);
    }

    #[test]
    fn mock_is_deterministic() {
        let a = propose(&post_match_context());
        let b = propose(&post_match_context());
        assert_eq!(a, b);
    }
}
