//! Tunable constants of the match model.
//!
//! Kept public so tests can assert the simulated distributions against
//! the intended ones, and so the numbers are findable in one place.

/// Base probability that *something* happens in a given minute, before
/// strength modulation.
pub const BASE_EVENT_RATE: f64 = 0.40;

/// Lower bound of the strength modulation factor on the event rate.
pub const EVENT_RATE_MOD_FLOOR: f64 = 0.85;

/// Strength divisor for event-rate modulation. Combined team strength
/// (roughly 60-140) divided by this is added to the floor.
pub const EVENT_RATE_MOD_DIVISOR: f64 = 650.0;

// ---------------------------------------------------------------------------
// Per-resolved-minute event mix. Weights sum to 1.0.
// ---------------------------------------------------------------------------

/// Goal from open play.
pub const W_GOAL: f64 = 0.06;
/// Foul.
pub const W_FOUL: f64 = 0.25;
/// Yellow card.
pub const W_YELLOW: f64 = 0.08;
/// Straight red card.
pub const W_RED: f64 = 0.005;
/// Substitution (only from minute 45, max 3 per team).
pub const W_SUBSTITUTION: f64 = 0.06;
/// Corner kick.
pub const W_CORNER: f64 = 0.14;
/// Free kick.
pub const W_FREE_KICK: f64 = 0.15;
/// Offside.
pub const W_OFFSIDE: f64 = 0.05;
/// Injury.
pub const W_INJURY: f64 = 0.015;
/// Penalty awarded.
pub const W_PENALTY: f64 = 0.015;
/// Nothing notable.
pub const W_IDLE: f64 = 0.175;

/// Share of free kicks that are direct.
pub const FREE_KICK_DIRECT_SHARE: f64 = 0.80;
/// Share of free kicks in dangerous territory.
pub const FREE_KICK_DANGEROUS_SHARE: f64 = 0.30;

/// Probability a penalty is converted.
pub const PENALTY_CONVERSION: f64 = 0.75;

/// Probability a goal carries an assist.
pub const ASSIST_CHANCE: f64 = 0.60;

/// Share of scorer samples restricted to attacking positions.
pub const ATTACKER_SCORER_SHARE: f64 = 0.85;

/// Earliest minute a substitution may occur.
pub const SUB_EARLIEST_MINUTE: u8 = 45;
/// Maximum substitutions per team.
pub const MAX_SUBSTITUTIONS: u32 = 3;

/// Fitness drained per on-field minute.
pub const FITNESS_DRAIN_PER_MINUTE: f64 = 0.5;

/// Probability per minute of an unremarkable shot attempt (stats only).
pub const SHOT_ATTEMPT_RATE: f64 = 0.15;
/// Share of non-goal shot attempts that are on target.
pub const SHOT_ON_TARGET_SHARE: f64 = 0.50;

/// Multiplier on the home side's attacking weight.
pub const HOME_ADVANTAGE: f64 = 1.10;

/// Exponent applied to attacking weights when deciding which side
/// scores. Linear weighting undersells quality gaps; squaring gives a
/// +20-attribute side a clear majority of results without making
/// upsets impossible.
pub const GOAL_STRENGTH_EXPONENT: f64 = 2.0;

/// Half-width of the deterministic possession jitter per minute.
pub const POSSESSION_JITTER: f64 = 0.05;

// ---------------------------------------------------------------------------
// Injury severity split.
// ---------------------------------------------------------------------------

/// Share of injuries that are minor (1-2 weeks).
pub const INJURY_MINOR_SHARE: f64 = 0.60;
/// Share of injuries that are moderate (3-6 weeks). The remainder is severe.
pub const INJURY_MODERATE_SHARE: f64 = 0.30;

// ---------------------------------------------------------------------------
// Player rating model.
// ---------------------------------------------------------------------------

/// Every fielded player starts here.
pub const RATING_BASE: f32 = 6.0;
/// Per goal scored.
pub const RATING_PER_GOAL: f32 = 1.0;
/// Per assist.
pub const RATING_PER_ASSIST: f32 = 0.5;
/// Per yellow card.
pub const RATING_PER_YELLOW: f32 = -0.3;
/// Per red card.
pub const RATING_PER_RED: f32 = -1.5;
/// Goalkeeper clean-sheet bonus.
pub const RATING_CLEAN_SHEET: f32 = 1.0;
/// Goalkeeper penalty for conceding more than three.
pub const RATING_KEEPER_LEAKY: f32 = -1.0;
/// Full span of the linear form bonus (`+/- 1.0` at form 100/0).
pub const RATING_FORM_SPAN: f32 = 1.0;
/// Maximum fitness penalty (at fitness 0).
pub const RATING_FITNESS_SPAN: f32 = 1.0;
/// Rating floor.
pub const RATING_MIN: f32 = 1.0;
/// Rating ceiling.
pub const RATING_MAX: f32 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_mix_sums_to_one() {
        let total = W_GOAL
            + W_FOUL
            + W_YELLOW
            + W_RED
            + W_SUBSTITUTION
            + W_CORNER
            + W_FREE_KICK
            + W_OFFSIDE
            + W_INJURY
            + W_PENALTY
            + W_IDLE;
        assert!((total - 1.0).abs() < 1e-9, "event mix sums to {total}");
    }
}
