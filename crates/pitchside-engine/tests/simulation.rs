//! Integration tests for the match simulator: determinism, score
//! conservation, statistic sanity, and the long-run event distribution.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use pitchside_engine::snapshot::{MatchInput, PlayerSnapshot, TeamSnapshot};
use pitchside_engine::{simulate, DerivedRng, SimulatedMatch};
use pitchside_types::{EventPayload, MatchId, PlayerId, Position, TeamId};

/// Build a synthetic squad of 16 with a plausible position spread.
fn squad(team: &str, base_skill: u8) -> TeamSnapshot {
    let spread = [
        ("gk1", Position::GK),
        ("cb1", Position::CB),
        ("cb2", Position::CB),
        ("lb1", Position::LB),
        ("rb1", Position::RB),
        ("cm1", Position::CM),
        ("cm2", Position::CM),
        ("lm1", Position::LM),
        ("rm1", Position::RM),
        ("cam1", Position::CAM),
        ("st1", Position::ST),
        ("st2", Position::ST),
        ("lw1", Position::LW),
        ("rw1", Position::RW),
        ("cb3", Position::CB),
        ("cm3", Position::CM),
    ];
    let mut players: Vec<PlayerSnapshot> = spread
        .iter()
        .enumerate()
        .map(|(i, (suffix, position))| {
            // Small deterministic variation so players are not clones.
            let skill = base_skill.saturating_add((i % 7) as u8);
            PlayerSnapshot {
                id: PlayerId::new(format!("{team}_{suffix}")),
                name: format!("{team} {suffix}"),
                position: *position,
                pace: skill,
                shooting: skill,
                passing: skill,
                defending: skill,
                physicality: skill,
                overall: skill,
                form: 50,
                morale: 50,
                fitness: 100,
            }
        })
        .collect();
    players.sort_by(|a, b| a.id.cmp(&b.id));
    TeamSnapshot {
        id: TeamId::new(team),
        name: team.to_owned(),
        players,
    }
}

fn input_for(seed: u64, home_skill: u8, away_skill: u8) -> MatchInput {
    MatchInput {
        match_id: MatchId::new("league-s1-md1-alpha-vs-beta"),
        home: squad("alpha", home_skill),
        away: squad("beta", away_skill),
        seed,
        weather: pitchside_types::Weather::Sunny,
        kickoff: Utc.with_ymd_and_hms(2025, 8, 1, 15, 0, 0).unwrap(),
    }
}

fn run(seed: u64) -> SimulatedMatch {
    simulate(&input_for(seed, 65, 65)).expect("simulation succeeds")
}

#[test]
fn identical_seed_identical_events() {
    let a = run(42);
    let b = run(42);
    assert_eq!(a.events.len(), b.events.len());
    for (ea, eb) in a.events.iter().zip(b.events.iter()) {
        assert_eq!(
            serde_json::to_string(ea).unwrap(),
            serde_json::to_string(eb).unwrap()
        );
    }
    assert_eq!(a.home_score, b.home_score);
    assert_eq!(a.player_ratings, b.player_ratings);
}

#[test]
fn different_seed_diverges() {
    // Across a handful of seeds at least one match must differ; a single
    // pair could legitimately tie on the same scoreline.
    let baseline = serde_json::to_string(&run(1).events).unwrap();
    let diverged = (2..8u64).any(|s| serde_json::to_string(&run(s).events).unwrap() != baseline);
    assert!(diverged);
}

#[test]
fn ends_with_exactly_one_match_ended() {
    let result = run(7);
    let ended: Vec<_> = result
        .events
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::MatchEnded { .. }))
        .collect();
    assert_eq!(ended.len(), 1);
    assert!(matches!(
        result.events.last().map(|e| &e.payload),
        Some(EventPayload::MatchEnded { .. })
    ));
    assert!(matches!(
        result.events.first().map(|e| &e.payload),
        Some(EventPayload::MatchStarted { .. })
    ));
}

#[test]
fn score_matches_goal_events() {
    for seed in 0..20u64 {
        let result = run(seed);
        let mut home = 0u32;
        let mut away = 0u32;
        for event in &result.events {
            if let EventPayload::Goal { team_id, .. } = &event.payload {
                if team_id.as_str() == "alpha" {
                    home += 1;
                } else {
                    away += 1;
                }
            }
        }
        assert_eq!(result.home_score, home, "seed {seed}");
        assert_eq!(result.away_score, away, "seed {seed}");
    }
}

#[test]
fn stats_invariants_hold() {
    for seed in 0..20u64 {
        let result = run(seed);
        let stats = &result.stats;
        assert_eq!(stats.home.possession + stats.away.possession, 100);
        assert!(stats.home.shots_on_target >= result.home_score);
        assert!(stats.away.shots_on_target >= result.away_score);
        assert!(stats.home.shots >= stats.home.shots_on_target);
        assert!(stats.away.shots >= stats.away.shots_on_target);
        assert!(stats.home.penalties_awarded >= stats.home.penalties_scored);
        assert!(stats.away.penalties_awarded >= stats.away.penalties_scored);
    }
}

#[test]
fn ratings_are_bounded_and_rounded() {
    for seed in 0..10u64 {
        let result = run(seed);
        assert!(!result.player_ratings.is_empty());
        for (id, rating) in &result.player_ratings {
            assert!((1.0..=10.0).contains(rating), "{id}: {rating}");
            let rounded = (rating * 10.0).round() / 10.0;
            assert!((rounded - rating).abs() < 1e-6, "{id}: {rating}");
        }
    }
}

#[test]
fn commentary_covers_goals() {
    let result = run(11);
    let goal_count = result
        .events
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::Goal { .. }))
        .count();
    if let Some(EventPayload::MatchEnded { commentary, .. }) =
        result.events.last().map(|e| &e.payload)
    {
        let goal_lines = commentary.iter().filter(|l| l.contains("GOAL!")).count();
        assert_eq!(goal_lines, goal_count);
    } else {
        panic!("last event must be MatchEnded");
    }
}

#[test]
fn stronger_side_wins_more_often() {
    // A +20 attribute edge should convert to a clear majority of wins
    // over 200 seeded repetitions, with a sane draw share.
    let mut wins = 0u32;
    let mut draws = 0u32;
    for seed in 0..200u64 {
        let result = simulate(&input_for(seed, 80, 60)).expect("simulation succeeds");
        if result.home_score > result.away_score {
            wins += 1;
        } else if result.home_score == result.away_score {
            draws += 1;
        }
    }
    assert!(wins > 110, "strong side won only {wins}/200");
    assert!((20..=80).contains(&draws), "draws: {draws}/200");
}

#[test]
fn event_distribution_within_bands() {
    // 100-match sample; long-run per-match means should sit inside the
    // coarse realism bands (20% tolerance at the edges).
    let mut goals = 0u32;
    let mut yellows = 0u32;
    let mut corners = 0u32;
    let mut offsides = 0u32;
    let mut penalties = 0u32;
    const MATCHES: u32 = 100;
    for seed in 0..u64::from(MATCHES) {
        let result = simulate(&input_for(seed + 1000, 65, 65)).expect("simulation succeeds");
        for event in &result.events {
            match &event.payload {
                EventPayload::Goal { .. } => goals += 1,
                EventPayload::YellowCard { .. } => yellows += 1,
                EventPayload::CornerKick { .. } => corners += 1,
                EventPayload::Offside { .. } => offsides += 1,
                EventPayload::PenaltyAwarded { .. } => penalties += 1,
                _ => {}
            }
        }
    }
    let per_match = |n: u32| f64::from(n) / f64::from(MATCHES);
    assert!(
        (1.2..=4.8).contains(&per_match(goals)),
        "goals/match: {}",
        per_match(goals)
    );
    assert!(
        (1.6..=7.2).contains(&per_match(yellows)),
        "yellows/match: {}",
        per_match(yellows)
    );
    assert!(
        (4.8..=16.8).contains(&per_match(corners)),
        "corners/match: {}",
        per_match(corners)
    );
    assert!(
        (1.2..=9.6).contains(&per_match(offsides)),
        "offsides/match: {}",
        per_match(offsides)
    );
    assert!(per_match(penalties) <= 0.9, "penalties/match: {}", per_match(penalties));
}

#[test]
fn substitutions_respect_limits() {
    for seed in 0..30u64 {
        let result = run(seed);
        let mut subs: BTreeMap<String, u32> = BTreeMap::new();
        for event in &result.events {
            if let EventPayload::Substitution { team_id, minute, .. } = &event.payload {
                *subs.entry(team_id.to_string()).or_default() += 1;
                assert!(*minute >= 45, "sub at minute {minute}");
            }
        }
        for (team, count) in subs {
            assert!(count <= 3, "{team} made {count} subs");
        }
    }
}

#[test]
fn second_yellow_becomes_red() {
    // Scan many seeds for a second-yellow dismissal and check the
    // bookkeeping when one occurs.
    let mut seen = false;
    for seed in 0..300u64 {
        let result = run(seed);
        let mut yellows: BTreeMap<String, u32> = BTreeMap::new();
        for event in &result.events {
            match &event.payload {
                EventPayload::YellowCard { player, .. } => {
                    *yellows.entry(player.to_string()).or_default() += 1;
                    assert!(yellows[player.as_str()] <= 1, "third card for {player}");
                }
                EventPayload::RedCard {
                    player,
                    second_yellow,
                    ..
                } => {
                    if *second_yellow {
                        assert_eq!(yellows.get(player.as_str()), Some(&1));
                        seen = true;
                    }
                }
                _ => {}
            }
        }
    }
    assert!(seen, "no second-yellow dismissal in 300 matches");
}

#[test]
fn derived_rng_streams_are_stable() {
    // The derived seed for a given tag set must never change: it is
    // recorded in MatchStarted events and replayed from the log.
    let a = DerivedRng::derive_seed(42, &["match", "m1"]);
    let b = DerivedRng::derive_seed(42, &["match", "m1"]);
    assert_eq!(a, b);
}
