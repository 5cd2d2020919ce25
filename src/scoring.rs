/// What the player (or the clock) decided about the current scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Safe,
    Unsafe,
    /// Question timer expired before a choice was made.
    NoAnswer,
}

/// Outcome of resolving a single question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub correct: bool,
    pub points_awarded: u32,
    pub new_streak: u32,
}

pub const BASE_POINTS: u32 = 100;
pub const TIME_BONUS_PER_UNIT: u32 = 10;
pub const STREAK_BONUS_PER_LEVEL: u32 = 10;

/// Score one answer. `question_units_remaining` is the number of whole
/// seconds left on the question clock when the choice was made; `streak` is
/// the streak going into this question.
pub fn resolve(
    choice: Choice,
    scenario_is_unsafe: bool,
    question_units_remaining: u32,
    streak: u32,
) -> Resolution {
    let correct = match choice {
        Choice::NoAnswer => false,
        Choice::Safe => !scenario_is_unsafe,
        Choice::Unsafe => scenario_is_unsafe,
    };

    if !correct {
        return Resolution {
            correct: false,
            points_awarded: 0,
            new_streak: 0,
        };
    }

    let new_streak = streak + 1;
    let points_awarded = BASE_POINTS
        + question_units_remaining * TIME_BONUS_PER_UNIT
        + new_streak * STREAK_BONUS_PER_LEVEL;

    Resolution {
        correct: true,
        points_awarded,
        new_streak,
    }
}
