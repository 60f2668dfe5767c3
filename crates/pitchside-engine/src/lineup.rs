//! Starting-eleven selection.
//!
//! Picks the best eleven by overall rating subject to the formation
//! constraints: exactly one goalkeeper, at least three defenders, at
//! least one forward. Everyone else fills out the side on rating alone.

use pitchside_types::Position;

use crate::error::EngineError;
use crate::snapshot::{PlayerSnapshot, TeamSnapshot};

/// A selected side: eleven starters plus the remaining bench.
#[derive(Debug, Clone)]
pub struct Lineup {
    /// The starting eleven. Index 0 is always the goalkeeper.
    pub starters: Vec<PlayerSnapshot>,
    /// Bench, best-rated first.
    pub bench: Vec<PlayerSnapshot>,
}

/// Sort key: best overall first, id ascending as the deterministic
/// tie-break.
fn by_rating(a: &PlayerSnapshot, b: &PlayerSnapshot) -> core::cmp::Ordering {
    b.overall.cmp(&a.overall).then_with(|| a.id.cmp(&b.id))
}

/// Select the starting eleven for a team snapshot.
///
/// # Errors
///
/// Returns [`EngineError::LineupInfeasible`] when the available squad
/// cannot satisfy the formation constraints (no goalkeeper, fewer than
/// three defenders, no forward, or fewer than eleven players).
pub fn select_starting_eleven(team: &TeamSnapshot) -> Result<Lineup, EngineError> {
    let infeasible = |reason: &str| EngineError::LineupInfeasible {
        team: team.id.to_string(),
        reason: reason.to_owned(),
    };

    if team.players.len() < 11 {
        return Err(infeasible("fewer than eleven available players"));
    }

    let mut keepers: Vec<&PlayerSnapshot> = team
        .players
        .iter()
        .filter(|p| p.position == Position::GK)
        .collect();
    let mut defenders: Vec<&PlayerSnapshot> = team
        .players
        .iter()
        .filter(|p| p.position.is_defender())
        .collect();
    let mut forwards: Vec<&PlayerSnapshot> = team
        .players
        .iter()
        .filter(|p| p.position.is_forward())
        .collect();

    keepers.sort_by(|a, b| by_rating(a, b));
    defenders.sort_by(|a, b| by_rating(a, b));
    forwards.sort_by(|a, b| by_rating(a, b));

    let keeper = keepers.first().ok_or_else(|| infeasible("no goalkeeper"))?;
    if defenders.len() < 3 {
        return Err(infeasible("fewer than three defenders"));
    }
    let forward = forwards.first().ok_or_else(|| infeasible("no forward"))?;

    let mut starters: Vec<PlayerSnapshot> = Vec::with_capacity(11);
    starters.push((*keeper).clone());
    for defender in defenders.iter().take(3) {
        starters.push((*defender).clone());
    }
    starters.push((*forward).clone());

    // Fill the remaining slots by rating from whoever is left, never a
    // second goalkeeper.
    let mut rest: Vec<&PlayerSnapshot> = team
        .players
        .iter()
        .filter(|p| p.position != Position::GK)
        .filter(|p| !starters.iter().any(|s| s.id == p.id))
        .collect();
    rest.sort_by(|a, b| by_rating(a, b));

    for player in &rest {
        if starters.len() == 11 {
            break;
        }
        starters.push((*player).clone());
    }

    if starters.len() < 11 {
        return Err(infeasible("fewer than eleven outfield-eligible players"));
    }

    let mut bench: Vec<PlayerSnapshot> = team
        .players
        .iter()
        .filter(|p| !starters.iter().any(|s| s.id == p.id))
        .cloned()
        .collect();
    bench.sort_by(by_rating);

    Ok(Lineup { starters, bench })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_types::{PlayerId, Position, TeamId};

    fn snap(id: &str, position: Position, overall: u8) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(id),
            name: id.to_owned(),
            position,
            pace: overall,
            shooting: overall,
            passing: overall,
            defending: overall,
            physicality: overall,
            overall,
            form: 50,
            morale: 50,
            fitness: 100,
        }
    }

    fn full_squad() -> TeamSnapshot {
        let mut players = vec![
            snap("gk1", Position::GK, 70),
            snap("gk2", Position::GK, 60),
            snap("cb1", Position::CB, 72),
            snap("cb2", Position::CB, 71),
            snap("lb1", Position::LB, 68),
            snap("rb1", Position::RB, 69),
            snap("cm1", Position::CM, 74),
            snap("cm2", Position::CM, 66),
            snap("lm1", Position::LM, 65),
            snap("rm1", Position::RM, 64),
            snap("cam1", Position::CAM, 75),
            snap("st1", Position::ST, 78),
            snap("st2", Position::ST, 62),
            snap("lw1", Position::LW, 70),
        ];
        players.sort_by(|a, b| a.id.cmp(&b.id));
        TeamSnapshot {
            id: TeamId::new("test_team"),
            name: String::from("Test Team"),
            players,
        }
    }

    #[test]
    fn picks_exactly_one_keeper() {
        let lineup = select_starting_eleven(&full_squad()).expect("lineup");
        assert_eq!(lineup.starters.len(), 11);
        let keepers = lineup
            .starters
            .iter()
            .filter(|p| p.position == Position::GK)
            .count();
        assert_eq!(keepers, 1);
        assert_eq!(lineup.starters[0].id.as_str(), "gk1");
    }

    #[test]
    fn satisfies_formation_constraints() {
        let lineup = select_starting_eleven(&full_squad()).expect("lineup");
        let defenders = lineup
            .starters
            .iter()
            .filter(|p| p.position.is_defender())
            .count();
        let forwards = lineup
            .starters
            .iter()
            .filter(|p| p.position.is_forward())
            .count();
        assert!(defenders >= 3, "defenders: {defenders}");
        assert!(forwards >= 1, "forwards: {forwards}");
    }

    #[test]
    fn bench_excludes_starters() {
        let lineup = select_starting_eleven(&full_squad()).expect("lineup");
        for benched in &lineup.bench {
            assert!(!lineup.starters.iter().any(|s| s.id == benched.id));
        }
        assert_eq!(lineup.starters.len() + lineup.bench.len(), 14);
    }

    #[test]
    fn no_keeper_is_infeasible() {
        let mut team = full_squad();
        team.players.retain(|p| p.position != Position::GK);
        let err = select_starting_eleven(&team).expect_err("must fail");
        assert!(matches!(err, EngineError::LineupInfeasible { .. }));
    }

    #[test]
    fn too_few_defenders_is_infeasible() {
        let mut team = full_squad();
        team.players.retain(|p| !p.position.is_defender());
        // Pad back to eleven with midfielders so only the defender
        // constraint can fail.
        for i in 0..4 {
            team.players.push(snap(&format!("pad{i}"), Position::CM, 50));
        }
        team.players.sort_by(|a, b| a.id.cmp(&b.id));
        let err = select_starting_eleven(&team).expect_err("must fail");
        assert!(matches!(err, EngineError::LineupInfeasible { .. }));
    }
}
