//! Pure point calculations for both games.

use serde::{Deserialize, Serialize};

const MATCH_BASE: u32 = 100;
const MATCH_STREAK_BONUS: f64 = 50.0;
const MATCH_COMBO_BONUS: f64 = 25.0;
const MATCH_TIME_FACTOR: f64 = 0.5;

const WORD_POINTS: u32 = 100;
const WORD_STREAK_BONUS: f64 = 25.0;
const WORD_STREAK_CAP: u32 = 6;
/// Words solved within this many seconds earn a speed bonus.
pub const WORD_FAST_SECS: u32 = 30;
const WORD_TIME_BONUS: u32 = 10;
const WORD_MIN_POINTS: u32 = 50;

/// Points per second left on the clock when a level is cleared.
pub const LEVEL_BONUS_PER_SEC: f64 = 10.0;

/// Player-selected difficulty, scaling word points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Counters in effect when a pair is matched. `streak` and `combo` already
/// include the match being scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchContext {
    pub level_index: usize,
    pub streak: u32,
    pub combo: u32,
    pub time_remaining: u32,
}

pub fn match_points(ctx: &MatchContext) -> u32 {
    let base = MATCH_BASE * (ctx.level_index as u32 + 1);
    let streak_bonus = (ctx.streak as f64 * MATCH_STREAK_BONUS).floor() as u32;
    let combo_bonus = (ctx.combo as f64 * MATCH_COMBO_BONUS).floor() as u32;
    let time_bonus = (ctx.time_remaining as f64 * MATCH_TIME_FACTOR).floor() as u32;

    base + streak_bonus + combo_bonus + time_bonus
}

/// Inputs for scoring a solved word. `streak` includes the word being scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordContext {
    pub level_index: usize,
    pub streak: u32,
    pub seconds_on_word: u32,
    pub hint_used: bool,
    pub hint_cost: u32,
    pub level_multiplier: f64,
    pub difficulty: Difficulty,
}

pub fn word_points(ctx: &WordContext) -> u32 {
    let base = (WORD_POINTS * (ctx.level_index as u32 + 1)) as f64;
    let streak_bonus = (2f64.powi(ctx.streak.min(WORD_STREAK_CAP) as i32) * WORD_STREAK_BONUS).floor();
    let time_bonus = (WORD_FAST_SECS.saturating_sub(ctx.seconds_on_word) * WORD_TIME_BONUS) as f64;
    let hint_penalty = if ctx.hint_used { ctx.hint_cost * 10 } else { 0 };

    let scaled = ((base + streak_bonus + time_bonus)
        * ctx.level_multiplier
        * ctx.difficulty.multiplier())
    .floor() as u32;

    scaled.saturating_sub(hint_penalty).max(WORD_MIN_POINTS)
}

/// Bonus for the seconds left when a level is cleared, in either game.
pub fn level_bonus(time_remaining: u32) -> u32 {
    (time_remaining as f64 * LEVEL_BONUS_PER_SEC).floor() as u32
}
