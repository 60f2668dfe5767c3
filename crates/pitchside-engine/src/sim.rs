//! The minute-tick match simulator.
//!
//! A match is a pure function of its [`MatchInput`]: the same snapshots
//! and seed always produce the same event sequence. The simulator walks
//! minutes 1..=90; each minute it drains fitness, tallies possession,
//! maybe records an unremarkable shot, and with a strength-modulated
//! probability resolves one event from a fixed categorical mix.
//!
//! The match state machine is `Created -> KickedOff -> Running -> Ended`;
//! any other transition is a fatal engine error and aborts the match.

use std::collections::BTreeMap;

use chrono::Duration;
use pitchside_types::{
    Event, EventPayload, FoulSeverity, FreeKickKind, FreeKickLocation, InjurySeverity, MatchStats,
    PlayerId, Position, TeamMatchStats, Weather,
};
use tracing::debug;

use crate::commentary;
use crate::constants::{
    ASSIST_CHANCE, ATTACKER_SCORER_SHARE, BASE_EVENT_RATE, EVENT_RATE_MOD_DIVISOR,
    EVENT_RATE_MOD_FLOOR, FITNESS_DRAIN_PER_MINUTE, FREE_KICK_DANGEROUS_SHARE,
    FREE_KICK_DIRECT_SHARE, GOAL_STRENGTH_EXPONENT, HOME_ADVANTAGE, INJURY_MINOR_SHARE,
    INJURY_MODERATE_SHARE, MAX_SUBSTITUTIONS, PENALTY_CONVERSION, POSSESSION_JITTER,
    SHOT_ATTEMPT_RATE, SHOT_ON_TARGET_SHARE, SUB_EARLIEST_MINUTE, W_CORNER, W_FOUL, W_FREE_KICK,
    W_GOAL, W_IDLE, W_INJURY, W_OFFSIDE, W_PENALTY, W_RED, W_SUBSTITUTION, W_YELLOW,
};
use crate::error::EngineError;
use crate::lineup::{select_starting_eleven, Lineup};
use crate::ratings::{player_rating, RatingInput};
use crate::rng::DerivedRng;
use crate::snapshot::{MatchInput, PlayerSnapshot};

/// Referee reasons for a yellow card. Index 1 ("Dissent") switches the
/// player weighting from low defending to low morale.
const YELLOW_REASONS: &[&str] = &[
    "Unsporting behavior",
    "Dissent",
    "Persistent fouling",
    "Delaying the game",
    "Simulation",
];

/// Referee reasons for a straight red card.
const RED_REASONS: &[&str] = &["Serious foul play", "Violent conduct", "Offensive language"];

/// Reasons a penalty gets awarded.
const PENALTY_REASONS: &[&str] = &[
    "Foul in the box",
    "Handball",
    "Tripping an attacker",
    "Dangerous play in the box",
];

/// Injury descriptions.
const INJURY_TYPES: &[&str] = &[
    "Muscle strain",
    "Ankle sprain",
    "Knee injury",
    "Hamstring pull",
    "Shoulder injury",
    "Back strain",
    "Concussion",
    "Bruised ribs",
];

/// Event-rate dampener applied in rain or snow.
const BAD_WEATHER_FACTOR: f64 = 0.95;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    KickedOff,
    Running,
    Ended,
}

impl Phase {
    const fn name(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::KickedOff => "KickedOff",
            Self::Running => "Running",
            Self::Ended => "Ended",
        }
    }
}

/// Guards the `Created -> KickedOff -> Running -> Ended` progression.
#[derive(Debug)]
struct MatchStateMachine {
    phase: Phase,
}

impl MatchStateMachine {
    const fn new() -> Self {
        Self {
            phase: Phase::Created,
        }
    }

    fn advance_to(&mut self, next: Phase) -> Result<(), EngineError> {
        let legal = matches!(
            (self.phase, next),
            (Phase::Created, Phase::KickedOff)
                | (Phase::KickedOff, Phase::Running)
                | (Phase::Running, Phase::Ended)
        );
        if !legal {
            return Err(EngineError::IllegalTransition {
                from: self.phase.name(),
                to: next.name(),
            });
        }
        self.phase = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-match side state
// ---------------------------------------------------------------------------

/// One player's in-match state and tallies.
#[derive(Debug, Clone)]
struct FieldedPlayer {
    snap: PlayerSnapshot,
    fitness: f64,
    on_pitch: bool,
    injured: bool,
    yellows: u32,
    red: bool,
    goals: u32,
    assists: u32,
}

impl FieldedPlayer {
    fn new(snap: PlayerSnapshot) -> Self {
        let fitness = f64::from(snap.fitness);
        Self {
            snap,
            fitness,
            on_pitch: true,
            injured: false,
            yellows: 0,
            red: false,
            goals: 0,
            assists: 0,
        }
    }
}

/// One team's in-match state.
#[derive(Debug)]
struct Side {
    team_id: pitchside_types::TeamId,
    team_name: String,
    is_home: bool,
    /// Everyone who has appeared, starters first, subs appended.
    players: Vec<FieldedPlayer>,
    bench: Vec<PlayerSnapshot>,
    subs_used: u32,
    goals: u32,
    stats: TeamMatchStats,
    possession_minutes: u32,
}

impl Side {
    fn from_lineup(team: &crate::snapshot::TeamSnapshot, lineup: Lineup, is_home: bool) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            is_home,
            players: lineup.starters.into_iter().map(FieldedPlayer::new).collect(),
            bench: lineup.bench,
            subs_used: 0,
            goals: 0,
            stats: TeamMatchStats::default(),
            possession_minutes: 0,
        }
    }

    /// Indexes of on-pitch players matching `filter`, sorted by player
    /// id so downstream weighted choices are canonically ordered.
    fn candidates(&self, filter: impl Fn(&FieldedPlayer) -> bool) -> Vec<usize> {
        let mut indexes: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.on_pitch && filter(p))
            .map(|(i, _)| i)
            .collect();
        indexes.sort_by(|a, b| self.players[*a].snap.id.cmp(&self.players[*b].snap.id));
        indexes
    }

    /// Mean attacking strength over on-pitch players.
    fn strength(&self) -> f64 {
        let on_pitch: Vec<&FieldedPlayer> =
            self.players.iter().filter(|p| p.on_pitch).collect();
        if on_pitch.is_empty() {
            return 1.0;
        }
        let total: f64 = on_pitch
            .iter()
            .map(|p| {
                f64::from(p.snap.shooting) * 0.4
                    + f64::from(p.snap.pace) * 0.2
                    + f64::from(p.snap.passing) * 0.2
                    + f64::from(p.snap.physicality) * 0.1
                    + f64::from(p.snap.form) * 0.1
            })
            .sum();
        total / on_pitch.len() as f64
    }

    /// Mean fitness over on-pitch players, in `[0, 100]`.
    fn fitness_mean(&self) -> f64 {
        let on_pitch: Vec<&FieldedPlayer> =
            self.players.iter().filter(|p| p.on_pitch).collect();
        if on_pitch.is_empty() {
            return 1.0;
        }
        on_pitch.iter().map(|p| p.fitness).sum::<f64>() / on_pitch.len() as f64
    }

    /// Goal-scoring weight: strength x home advantage x fitness mean.
    fn attacking_weight(&self) -> f64 {
        let advantage = if self.is_home { HOME_ADVANTAGE } else { 1.0 };
        self.strength() * advantage * (self.fitness_mean() / 100.0)
    }

    fn drain_fitness(&mut self) {
        for player in &mut self.players {
            if player.on_pitch {
                player.fitness = (player.fitness - FITNESS_DRAIN_PER_MINUTE).max(0.0);
            }
        }
    }

    fn can_substitute(&self, minute: u8) -> bool {
        minute >= SUB_EARLIEST_MINUTE
            && self.subs_used < MAX_SUBSTITUTIONS
            && !self.bench.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The result of simulating one match.
#[derive(Debug, Clone)]
pub struct SimulatedMatch {
    /// The match simulated.
    pub match_id: pitchside_types::MatchId,
    /// Home team.
    pub home_team_id: pitchside_types::TeamId,
    /// Away team.
    pub away_team_id: pitchside_types::TeamId,
    /// Final home score.
    pub home_score: u32,
    /// Final away score.
    pub away_score: u32,
    /// The full ordered event sequence, ending with `MatchEnded`.
    pub events: Vec<Event>,
    /// Final statistics (also embedded in the `MatchEnded` payload).
    pub stats: MatchStats,
    /// Final ratings for everyone who appeared.
    pub player_ratings: BTreeMap<PlayerId, f32>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Simulate one match to completion.
///
/// # Errors
///
/// Returns [`EngineError`] when a starting eleven cannot be formed or
/// the state machine is violated. No events are produced on error; the
/// caller rolls the match back.
pub fn simulate(input: &MatchInput) -> Result<SimulatedMatch, EngineError> {
    let mut rng = DerivedRng::derive(input.seed, &["match"]);
    let mut machine = MatchStateMachine::new();

    let home_lineup = select_starting_eleven(&input.home)?;
    let away_lineup = select_starting_eleven(&input.away)?;
    let mut home = Side::from_lineup(&input.home, home_lineup, true);
    let mut away = Side::from_lineup(&input.away, away_lineup, false);

    let mut events: Vec<Event> = Vec::new();
    let mut lines: Vec<String> = Vec::new();

    let stamp = |minute: u8| input.kickoff + Duration::minutes(i64::from(minute));

    machine.advance_to(Phase::KickedOff)?;
    events.push(Event::new(
        input.kickoff,
        EventPayload::MatchStarted {
            match_id: input.match_id.clone(),
            seed: input.seed,
        },
    ));
    events.push(Event::new(
        input.kickoff,
        EventPayload::KickOff {
            match_id: input.match_id.clone(),
        },
    ));

    machine.advance_to(Phase::Running)?;

    let weather_factor = match input.weather {
        Weather::Rainy | Weather::Snowy => BAD_WEATHER_FACTOR,
        _ => 1.0,
    };

    for minute in 1..=90u8 {
        home.drain_fitness();
        away.drain_fitness();

        tally_possession(&mut rng, &mut home, &mut away);
        tally_idle_shot(&mut rng, &mut home, &mut away);

        let combined = home.strength() + away.strength();
        let rate = BASE_EVENT_RATE
            * (EVENT_RATE_MOD_FLOOR + combined / EVENT_RATE_MOD_DIVISOR)
            * weather_factor;
        if !rng.chance(rate) {
            continue;
        }

        resolve_minute(
            &mut rng, input, minute, &mut home, &mut away, &mut events, &mut lines, stamp,
        );
    }

    machine.advance_to(Phase::Ended)?;

    // Possession percentages always sum to exactly 100.
    let total_minutes = (home.possession_minutes + away.possession_minutes).max(1);
    let home_possession =
        ((home.possession_minutes * 100) as f64 / f64::from(total_minutes)).round() as u8;
    home.stats.possession = home_possession;
    away.stats.possession = 100 - home_possession;

    lines.push(commentary::full_time(
        &home.team_name,
        home.goals,
        &away.team_name,
        away.goals,
    ));

    let ratings = collect_ratings(&home, &away);
    let stats = MatchStats {
        home: home.stats.clone(),
        away: away.stats.clone(),
    };

    events.push(Event::new(
        stamp(90),
        EventPayload::MatchEnded {
            match_id: input.match_id.clone(),
            home_team_id: home.team_id.clone(),
            away_team_id: away.team_id.clone(),
            home_score: home.goals,
            away_score: away.goals,
            stats: stats.clone(),
            commentary: lines,
            player_ratings: ratings.clone(),
        },
    ));

    debug!(
        match_id = %input.match_id,
        home = %home.team_id,
        away = %away.team_id,
        score = %format!("{}-{}", home.goals, away.goals),
        events = events.len(),
        "match simulated"
    );

    Ok(SimulatedMatch {
        match_id: input.match_id.clone(),
        home_team_id: home.team_id,
        away_team_id: away.team_id,
        home_score: home.goals,
        away_score: away.goals,
        events,
        stats,
        player_ratings: ratings,
    })
}

/// Credit this minute's possession to one side, strength-weighted with
/// bounded jitter.
fn tally_possession(rng: &mut DerivedRng, home: &mut Side, away: &mut Side) {
    let home_weight = home.attacking_weight();
    let total = home_weight + away.attacking_weight();
    let jitter = (rng.unit() * 2.0 - 1.0) * POSSESSION_JITTER;
    let p_home = (home_weight / total + jitter).clamp(0.05, 0.95);
    if rng.chance(p_home) {
        home.possession_minutes += 1;
    } else {
        away.possession_minutes += 1;
    }
}

/// Maybe record an unremarkable shot attempt (statistics only).
fn tally_idle_shot(rng: &mut DerivedRng, home: &mut Side, away: &mut Side) {
    if !rng.chance(SHOT_ATTEMPT_RATE) {
        return;
    }
    let home_weight = home.attacking_weight();
    let total = home_weight + away.attacking_weight();
    let side = if rng.chance(home_weight / total) {
        home
    } else {
        away
    };
    side.stats.shots += 1;
    if rng.chance(SHOT_ON_TARGET_SHARE) {
        side.stats.shots_on_target += 1;
    }
}

/// Which event the resolved minute produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MinuteEvent {
    Goal,
    Foul,
    Yellow,
    Red,
    Substitution,
    Corner,
    FreeKick,
    Offside,
    Injury,
    Penalty,
    Idle,
}

/// Fixed categorical mix, in declaration order.
const EVENT_MIX: [(MinuteEvent, f64); 11] = [
    (MinuteEvent::Goal, W_GOAL),
    (MinuteEvent::Foul, W_FOUL),
    (MinuteEvent::Yellow, W_YELLOW),
    (MinuteEvent::Red, W_RED),
    (MinuteEvent::Substitution, W_SUBSTITUTION),
    (MinuteEvent::Corner, W_CORNER),
    (MinuteEvent::FreeKick, W_FREE_KICK),
    (MinuteEvent::Offside, W_OFFSIDE),
    (MinuteEvent::Injury, W_INJURY),
    (MinuteEvent::Penalty, W_PENALTY),
    (MinuteEvent::Idle, W_IDLE),
];

#[allow(clippy::too_many_arguments)]
fn resolve_minute(
    rng: &mut DerivedRng,
    input: &MatchInput,
    minute: u8,
    home: &mut Side,
    away: &mut Side,
    events: &mut Vec<Event>,
    lines: &mut Vec<String>,
    stamp: impl Fn(u8) -> chrono::DateTime<chrono::Utc>,
) {
    let weights: Vec<f64> = EVENT_MIX.iter().map(|(_, w)| *w).collect();
    let Some(pick) = rng.weighted_choice(&weights) else {
        return;
    };
    let timestamp = stamp(minute);

    match EVENT_MIX[pick].0 {
        MinuteEvent::Goal => {
            let home_weight = home.attacking_weight().powf(GOAL_STRENGTH_EXPONENT);
            let total = home_weight + away.attacking_weight().powf(GOAL_STRENGTH_EXPONENT);
            let home_scores = rng.chance(home_weight / total);
            resolve_goal(
                rng, input, minute, home, away, events, lines, timestamp, false, home_scores,
            );
        }
        MinuteEvent::Foul => {
            // The side under pressure fouls more: weight by the
            // opponent's strength.
            let home_fouls = rng.chance(away.strength() / (home.strength() + away.strength()));
            let side = if home_fouls { home } else { away };
            let candidates = side.candidates(|_| true);
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&i| f64::from(100 - side.players[i].snap.defending.min(99)) + 1.0)
                .collect();
            let Some(ci) = rng.weighted_choice(&weights) else {
                return;
            };
            let player = &side.players[candidates[ci]];
            let severity_roll = rng.unit();
            let severity = if severity_roll < 0.70 {
                FoulSeverity::Regular
            } else if severity_roll < 0.90 {
                FoulSeverity::Dangerous
            } else {
                FoulSeverity::Professional
            };
            side.stats.fouls += 1;
            events.push(Event::new(
                timestamp,
                EventPayload::Foul {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    player: player.snap.id.clone(),
                    severity,
                },
            ));
        }
        MinuteEvent::Yellow => {
            let side = if rng.chance(0.5) { home } else { away };
            let Some(reason_idx) = rng.index(YELLOW_REASONS.len()) else {
                return;
            };
            let reason = YELLOW_REASONS[reason_idx];
            let candidates = side.candidates(|_| true);
            // Dissent is a temperament problem; everything else is a
            // defending problem.
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&i| {
                    let p = &side.players[i].snap;
                    if reason == "Dissent" {
                        f64::from(100 - p.morale.min(99)) + 1.0
                    } else {
                        f64::from(100 - p.defending.min(99)) + 1.0
                    }
                })
                .collect();
            let Some(ci) = rng.weighted_choice(&weights) else {
                return;
            };
            let idx = candidates[ci];
            if side.players[idx].yellows >= 1 {
                // Second yellow: straight to red.
                side.players[idx].red = true;
                side.players[idx].on_pitch = false;
                side.stats.red_cards += 1;
                let player_id = side.players[idx].snap.id.clone();
                lines.push(commentary::red_card(
                    minute,
                    &side.players[idx].snap.name,
                    "Second yellow card",
                    true,
                ));
                events.push(Event::new(
                    timestamp,
                    EventPayload::RedCard {
                        match_id: input.match_id.clone(),
                        minute,
                        team_id: side.team_id.clone(),
                        player: player_id,
                        reason: String::from("Second yellow card"),
                        second_yellow: true,
                    },
                ));
            } else {
                side.players[idx].yellows += 1;
                side.stats.yellow_cards += 1;
                lines.push(commentary::yellow_card(
                    minute,
                    &side.players[idx].snap.name,
                    reason,
                ));
                events.push(Event::new(
                    timestamp,
                    EventPayload::YellowCard {
                        match_id: input.match_id.clone(),
                        minute,
                        team_id: side.team_id.clone(),
                        player: side.players[idx].snap.id.clone(),
                        reason: reason.to_owned(),
                    },
                ));
            }
        }
        MinuteEvent::Red => {
            let side = if rng.chance(0.5) { home } else { away };
            let Some(reason_idx) = rng.index(RED_REASONS.len()) else {
                return;
            };
            let candidates = side.candidates(|_| true);
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&i| f64::from(100 - side.players[i].snap.defending.min(99)) + 1.0)
                .collect();
            let Some(ci) = rng.weighted_choice(&weights) else {
                return;
            };
            let idx = candidates[ci];
            side.players[idx].red = true;
            side.players[idx].on_pitch = false;
            side.stats.red_cards += 1;
            lines.push(commentary::red_card(
                minute,
                &side.players[idx].snap.name,
                RED_REASONS[reason_idx],
                false,
            ));
            events.push(Event::new(
                timestamp,
                EventPayload::RedCard {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    player: side.players[idx].snap.id.clone(),
                    reason: RED_REASONS[reason_idx].to_owned(),
                    second_yellow: false,
                },
            ));
        }
        MinuteEvent::Substitution => {
            let home_can = home.can_substitute(minute);
            let away_can = away.can_substitute(minute);
            let side = match (home_can, away_can) {
                (true, true) => {
                    if rng.chance(0.5) {
                        home
                    } else {
                        away
                    }
                }
                (true, false) => home,
                (false, true) => away,
                (false, false) => return,
            };
            // Tired legs go first; the keeper stays on.
            let candidates = side.candidates(|p| p.snap.position != Position::GK);
            let Some(&off_idx) = candidates.iter().min_by(|&&a, &&b| {
                side.players[a]
                    .fitness
                    .partial_cmp(&side.players[b].fitness)
                    .unwrap_or(core::cmp::Ordering::Equal)
                    .then_with(|| side.players[a].snap.id.cmp(&side.players[b].snap.id))
            }) else {
                return;
            };
            let replacement = side.bench.remove(0);
            side.players[off_idx].on_pitch = false;
            let off_id = side.players[off_idx].snap.id.clone();
            let off_name = side.players[off_idx].snap.name.clone();
            side.subs_used += 1;
            lines.push(commentary::substitution(
                minute,
                &off_name,
                &replacement.name,
                &side.team_name,
            ));
            events.push(Event::new(
                timestamp,
                EventPayload::Substitution {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    player_off: off_id,
                    player_on: replacement.id.clone(),
                },
            ));
            side.players.push(FieldedPlayer::new(replacement));
        }
        MinuteEvent::Corner => {
            let home_weight = home.attacking_weight();
            let total = home_weight + away.attacking_weight();
            let side = if rng.chance(home_weight / total) {
                home
            } else {
                away
            };
            side.stats.corners += 1;
            lines.push(commentary::corner(minute, &side.team_name));
            events.push(Event::new(
                timestamp,
                EventPayload::CornerKick {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                },
            ));
        }
        MinuteEvent::FreeKick => {
            let home_weight = home.attacking_weight();
            let total = home_weight + away.attacking_weight();
            let side = if rng.chance(home_weight / total) {
                home
            } else {
                away
            };
            let kind = if rng.chance(FREE_KICK_DIRECT_SHARE) {
                FreeKickKind::Direct
            } else {
                FreeKickKind::Indirect
            };
            let location = if rng.chance(FREE_KICK_DANGEROUS_SHARE) {
                FreeKickLocation::Dangerous
            } else {
                FreeKickLocation::Safe
            };
            side.stats.free_kicks += 1;
            lines.push(commentary::free_kick(minute, &side.team_name, kind, location));
            events.push(Event::new(
                timestamp,
                EventPayload::FreeKick {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    free_kick_kind: kind,
                    location,
                },
            ));
        }
        MinuteEvent::Offside => {
            let home_weight = home.attacking_weight();
            let total = home_weight + away.attacking_weight();
            let side = if rng.chance(home_weight / total) {
                home
            } else {
                away
            };
            let mut candidates = side.candidates(|p| p.snap.position.is_attacking());
            if candidates.is_empty() {
                candidates = side.candidates(|p| p.snap.position != Position::GK);
            }
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&i| f64::from(side.players[i].snap.pace) + 1.0)
                .collect();
            let Some(ci) = rng.weighted_choice(&weights) else {
                return;
            };
            let player = &side.players[candidates[ci]];
            side.stats.offsides += 1;
            lines.push(commentary::offside(minute, &player.snap.name));
            events.push(Event::new(
                timestamp,
                EventPayload::Offside {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    player: player.snap.id.clone(),
                },
            ));
        }
        MinuteEvent::Injury => {
            let side = if rng.chance(0.5) { home } else { away };
            let candidates = side.candidates(|p| !p.injured);
            let Some(ci) = rng.index(candidates.len()) else {
                return;
            };
            let idx = candidates[ci];
            let Some(type_idx) = rng.index(INJURY_TYPES.len()) else {
                return;
            };
            let severity_roll = rng.unit();
            let (severity, weeks_out) = if severity_roll < INJURY_MINOR_SHARE {
                (InjurySeverity::Minor, rng.range_inclusive(1, 2))
            } else if severity_roll < INJURY_MINOR_SHARE + INJURY_MODERATE_SHARE {
                (InjurySeverity::Moderate, rng.range_inclusive(3, 6))
            } else {
                (InjurySeverity::Severe, rng.range_inclusive(7, 16))
            };
            side.players[idx].injured = true;
            lines.push(commentary::injury(
                minute,
                &side.players[idx].snap.name,
                INJURY_TYPES[type_idx],
                severity,
            ));
            events.push(Event::new(
                timestamp,
                EventPayload::Injury {
                    match_id: input.match_id.clone(),
                    minute,
                    team_id: side.team_id.clone(),
                    player: side.players[idx].snap.id.clone(),
                    description: INJURY_TYPES[type_idx].to_owned(),
                    severity,
                    weeks_out,
                },
            ));
        }
        MinuteEvent::Penalty => {
            let home_weight = home.attacking_weight().powf(GOAL_STRENGTH_EXPONENT);
            let total = home_weight + away.attacking_weight().powf(GOAL_STRENGTH_EXPONENT);
            let home_awarded = rng.chance(home_weight / total);
            let Some(reason_idx) = rng.index(PENALTY_REASONS.len()) else {
                return;
            };
            {
                let side = if home_awarded { &mut *home } else { &mut *away };
                side.stats.penalties_awarded += 1;
                lines.push(commentary::penalty_awarded(
                    minute,
                    &side.team_name,
                    PENALTY_REASONS[reason_idx],
                ));
                events.push(Event::new(
                    timestamp,
                    EventPayload::PenaltyAwarded {
                        match_id: input.match_id.clone(),
                        minute,
                        team_id: side.team_id.clone(),
                        reason: PENALTY_REASONS[reason_idx].to_owned(),
                    },
                ));
            }
            if rng.chance(PENALTY_CONVERSION) {
                resolve_goal(
                    rng,
                    input,
                    minute,
                    home,
                    away,
                    events,
                    lines,
                    timestamp,
                    true,
                    home_awarded,
                );
            } else {
                let side = if home_awarded { home } else { away };
                side.stats.shots += 1;
                if let Some(name) = penalty_taker(side) {
                    lines.push(commentary::penalty_missed(minute, &name));
                }
            }
        }
        MinuteEvent::Idle => {}
    }
}

/// Name of the side's designated penalty taker, for commentary.
fn penalty_taker(side: &Side) -> Option<String> {
    let mut candidates = side.candidates(|p| p.snap.position.is_attacking());
    if candidates.is_empty() {
        candidates = side.candidates(|p| p.snap.position != Position::GK);
    }
    candidates
        .into_iter()
        .max_by(|&a, &b| {
            side.players[a]
                .snap
                .shooting
                .cmp(&side.players[b].snap.shooting)
                .then_with(|| side.players[b].snap.id.cmp(&side.players[a].snap.id))
        })
        .map(|i| side.players[i].snap.name.clone())
}

/// Resolve a goal for the side the caller already chose: the scorer is
/// picked by `shooting + pace + form` (85% restricted to attacking
/// positions), with a 60%-likely assist weighted by passing.
#[allow(clippy::too_many_arguments)]
fn resolve_goal(
    rng: &mut DerivedRng,
    input: &MatchInput,
    minute: u8,
    home: &mut Side,
    away: &mut Side,
    events: &mut Vec<Event>,
    lines: &mut Vec<String>,
    timestamp: chrono::DateTime<chrono::Utc>,
    penalty: bool,
    home_scores: bool,
) {
    // Resolve the scorer before touching any counter: a side with
    // nobody left on the pitch produces no goal at all.
    let scorer_idx = {
        let side: &Side = if home_scores { home } else { away };
        let mut pool = if rng.chance(ATTACKER_SCORER_SHARE) {
            side.candidates(|p| p.snap.position.is_attacking())
        } else {
            side.candidates(|p| p.snap.position != Position::GK)
        };
        if pool.is_empty() {
            pool = side.candidates(|p| p.snap.position != Position::GK);
        }
        let weights: Vec<f64> = pool
            .iter()
            .map(|&i| {
                let p = &side.players[i].snap;
                f64::from(p.shooting) + f64::from(p.pace) + f64::from(p.form)
            })
            .collect();
        let Some(pick) = rng.weighted_choice(&weights) else {
            return;
        };
        pool[pick]
    };

    let (home_goals, away_goals) = if home_scores {
        home.goals += 1;
        (home.goals, away.goals)
    } else {
        away.goals += 1;
        (home.goals, away.goals)
    };

    let side = if home_scores { home } else { away };
    side.stats.shots += 1;
    side.stats.shots_on_target += 1;
    if penalty {
        side.stats.penalties_scored += 1;
    }
    side.players[scorer_idx].goals += 1;
    let scorer_id = side.players[scorer_idx].snap.id.clone();
    let scorer_name = side.players[scorer_idx].snap.name.clone();

    // Penalties are unassisted.
    let assist = if !penalty && rng.chance(ASSIST_CHANCE) {
        let pool = side.candidates(|p| {
            p.snap.position != Position::GK && p.snap.id != scorer_id
        });
        let weights: Vec<f64> = pool
            .iter()
            .map(|&i| f64::from(side.players[i].snap.passing) + 1.0)
            .collect();
        rng.weighted_choice(&weights).map(|ci| {
            let idx = pool[ci];
            side.players[idx].assists += 1;
            side.players[idx].snap.id.clone()
        })
    } else {
        None
    };

    let assist_name = assist.as_ref().and_then(|id| {
        side.players
            .iter()
            .find(|p| p.snap.id == *id)
            .map(|p| p.snap.name.clone())
    });
    lines.push(commentary::goal(
        minute,
        &scorer_name,
        &side.team_name,
        assist_name.as_deref(),
        penalty,
    ));

    events.push(Event::new(
        timestamp,
        EventPayload::Goal {
            match_id: input.match_id.clone(),
            minute,
            team_id: side.team_id.clone(),
            scorer: scorer_id,
            assist,
            penalty,
            home_score: home_goals,
            away_score: away_goals,
        },
    ));
}

/// Final ratings for everyone who appeared on either side.
fn collect_ratings(home: &Side, away: &Side) -> BTreeMap<PlayerId, f32> {
    let mut ratings = BTreeMap::new();
    for (side, conceded) in [(home, away.goals), (away, home.goals)] {
        for player in &side.players {
            let input = RatingInput {
                position: player.snap.position,
                goals: player.goals,
                assists: player.assists,
                yellows: player.yellows,
                red: player.red,
                form: player.snap.form,
                fitness_at_end: player.fitness,
                team_conceded: conceded,
            };
            ratings.insert(player.snap.id.clone(), player_rating(&input));
        }
    }
    ratings
}
