//! Post-match player ratings.
//!
//! Base 6.0, adjusted for goal involvement, discipline, goalkeeping,
//! form and fatigue, clamped to `[1.0, 10.0]` and rounded to one
//! decimal.

use pitchside_types::Position;

use crate::constants::{
    RATING_BASE, RATING_CLEAN_SHEET, RATING_FITNESS_SPAN, RATING_FORM_SPAN, RATING_KEEPER_LEAKY,
    RATING_MAX, RATING_MIN, RATING_PER_ASSIST, RATING_PER_GOAL, RATING_PER_RED, RATING_PER_YELLOW,
};

/// Everything the rating formula consumes for one player.
#[derive(Debug, Clone, Copy)]
pub struct RatingInput {
    /// Position on the pitch.
    pub position: Position,
    /// Goals scored.
    pub goals: u32,
    /// Assists provided.
    pub assists: u32,
    /// Yellow cards received.
    pub yellows: u32,
    /// Whether the player was sent off.
    pub red: bool,
    /// Form at kick-off.
    pub form: u8,
    /// Fitness at the final whistle.
    pub fitness_at_end: f64,
    /// Goals the player's team conceded (goalkeeper adjustments).
    pub team_conceded: u32,
}

/// Compute a single player's match rating.
pub fn player_rating(input: &RatingInput) -> f32 {
    let mut rating = RATING_BASE;
    rating += input.goals as f32 * RATING_PER_GOAL;
    rating += input.assists as f32 * RATING_PER_ASSIST;
    rating += input.yellows as f32 * RATING_PER_YELLOW;
    if input.red {
        rating += RATING_PER_RED;
    }

    if input.position == Position::GK {
        if input.team_conceded == 0 {
            rating += RATING_CLEAN_SHEET;
        } else if input.team_conceded > 3 {
            rating += RATING_KEEPER_LEAKY;
        }
    }

    // Form bonus is linear through 50: +span at 100, -span at 0.
    rating += (f32::from(input.form) - 50.0) / 50.0 * RATING_FORM_SPAN;

    // Fatigue penalty is linear in how much fitness is gone.
    let fitness = input.fitness_at_end.clamp(0.0, 100.0) as f32;
    rating -= (100.0 - fitness) / 100.0 * RATING_FITNESS_SPAN;

    let clamped = rating.clamp(RATING_MIN, RATING_MAX);
    (clamped * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> RatingInput {
        RatingInput {
            position: Position::CM,
            goals: 0,
            assists: 0,
            yellows: 0,
            red: false,
            form: 50,
            fitness_at_end: 100.0,
            team_conceded: 1,
        }
    }

    #[test]
    fn neutral_player_rates_at_base() {
        assert_eq!(player_rating(&neutral()), 6.0);
    }

    #[test]
    fn brace_and_assist_add_up() {
        let input = RatingInput {
            goals: 2,
            assists: 1,
            ..neutral()
        };
        assert_eq!(player_rating(&input), 8.5);
    }

    #[test]
    fn keeper_clean_sheet_bonus() {
        let input = RatingInput {
            position: Position::GK,
            team_conceded: 0,
            ..neutral()
        };
        assert_eq!(player_rating(&input), 7.0);
    }

    #[test]
    fn leaky_keeper_penalized() {
        let input = RatingInput {
            position: Position::GK,
            team_conceded: 4,
            ..neutral()
        };
        assert_eq!(player_rating(&input), 5.0);
    }

    #[test]
    fn rating_is_clamped() {
        let input = RatingInput {
            goals: 6,
            assists: 4,
            form: 100,
            ..neutral()
        };
        assert_eq!(player_rating(&input), 10.0);

        let input = RatingInput {
            red: true,
            yellows: 1,
            form: 0,
            fitness_at_end: 0.0,
            ..neutral()
        };
        assert!(player_rating(&input) >= 1.0);
    }

    #[test]
    fn rounded_to_one_decimal() {
        let input = RatingInput {
            form: 67,
            ..neutral()
        };
        let rating = player_rating(&input);
        assert_eq!((rating * 10.0).round() / 10.0, rating);
    }
}
