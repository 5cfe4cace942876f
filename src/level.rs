use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// Which mini-game a catalog, puzzle or session belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    Memory,
    Words,
}

/// Per-mode unit counts of a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelShape {
    /// Memory match: number of card pairs on the board.
    Pairs { pair_count: usize },
    /// Word challenge: number of words and letters hidden in each.
    Words {
        item_count: usize,
        missing_per_item: usize,
        /// Highest word tier drawn for this level.
        max_tier: u8,
    },
}

/// Static definition of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDefinition {
    pub index: usize,
    pub time_budget_secs: u32,
    /// Moves available in memory match. `None` for word levels.
    pub move_budget: Option<u32>,
    pub shape: LevelShape,
    pub score_multiplier: f64,
    pub difficulty_label: &'static str,
    /// Hint cost in word mode, multiplied by 10 when deducted.
    pub hint_cost: u32,
    /// Seconds removed from the clock on a wrong word.
    pub wrong_answer_penalty_secs: u32,
}

impl LevelDefinition {
    /// Number of puzzle units (pairs or words) to clear.
    pub fn item_count(&self) -> usize {
        match self.shape {
            LevelShape::Pairs { pair_count } => pair_count,
            LevelShape::Words { item_count, .. } => item_count,
        }
    }

    /// Hidden units per item: 2 cards per pair, or missing letters per word.
    pub fn missing_units_per_item(&self) -> usize {
        match self.shape {
            LevelShape::Pairs { .. } => 2,
            LevelShape::Words {
                missing_per_item, ..
            } => missing_per_item,
        }
    }

    pub fn seconds_per_item(&self) -> f64 {
        self.time_budget_secs as f64 / self.item_count().max(1) as f64
    }
}

const fn memory_level(
    index: usize,
    pair_count: usize,
    time: u32,
    moves: u32,
    multiplier: f64,
    label: &'static str,
) -> LevelDefinition {
    LevelDefinition {
        index,
        time_budget_secs: time,
        move_budget: Some(moves),
        shape: LevelShape::Pairs { pair_count },
        score_multiplier: multiplier,
        difficulty_label: label,
        hint_cost: 0,
        wrong_answer_penalty_secs: 0,
    }
}

const fn word_level(
    index: usize,
    item_count: usize,
    missing_per_item: usize,
    time: u32,
    hint_cost: u32,
    multiplier: f64,
    label: &'static str,
) -> LevelDefinition {
    LevelDefinition {
        index,
        time_budget_secs: time,
        move_budget: None,
        shape: LevelShape::Words {
            item_count,
            missing_per_item,
            max_tier: index as u8 + 1,
        },
        score_multiplier: multiplier,
        difficulty_label: label,
        hint_cost,
        wrong_answer_penalty_secs: WRONG_ANSWER_PENALTY_SECS,
    }
}

const WRONG_ANSWER_PENALTY_SECS: u32 = 5;

static MEMORY_LEVELS: [LevelDefinition; 5] = [
    memory_level(0, 2, 60, 20, 1.0, "Easy"),
    memory_level(1, 3, 75, 25, 1.25, "Medium"),
    memory_level(2, 6, 90, 30, 1.5, "Hard"),
    memory_level(3, 8, 105, 35, 1.75, "Expert"),
    memory_level(4, 10, 120, 40, 2.0, "Master"),
];

static WORD_LEVELS: [LevelDefinition; 5] = [
    word_level(0, 5, 1, 90, 5, 1.0, "Easy"),
    word_level(1, 6, 1, 75, 10, 1.5, "Medium"),
    word_level(2, 7, 2, 60, 15, 2.0, "Hard"),
    word_level(3, 8, 2, 45, 20, 2.5, "Expert"),
    word_level(4, 10, 3, 30, 25, 3.0, "Master"),
];

/// Fixed, ascending-difficulty list of levels for one game mode.
#[derive(Debug, Clone, Copy)]
pub struct LevelCatalog {
    mode: GameMode,
    levels: &'static [LevelDefinition],
}

impl LevelCatalog {
    pub fn for_mode(mode: GameMode) -> Self {
        let levels: &'static [LevelDefinition] = match mode {
            GameMode::Memory => &MEMORY_LEVELS,
            GameMode::Words => &WORD_LEVELS,
        };
        Self { mode, levels }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }

    pub fn get_level(&self, index: usize) -> GameResult<&'static LevelDefinition> {
        self.levels.get(index).ok_or(GameError::OutOfRange {
            index,
            len: self.levels.len(),
        })
    }

    pub fn levels(&self) -> &'static [LevelDefinition] {
        self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn both_catalogs() -> [LevelCatalog; 2] {
        [
            LevelCatalog::for_mode(GameMode::Memory),
            LevelCatalog::for_mode(GameMode::Words),
        ]
    }

    #[test]
    fn out_of_range_reports_catalog_length() {
        for catalog in both_catalogs() {
            assert_matches!(
                catalog.get_level(catalog.len()),
                Err(GameError::OutOfRange { index: 5, len: 5 })
            );
        }
    }

    #[test]
    fn indices_follow_catalog_order() {
        for catalog in both_catalogs() {
            for (i, level) in catalog.levels().iter().enumerate() {
                assert_eq!(level.index, i);
                assert_eq!(catalog.get_level(i).unwrap().index, i);
            }
        }
    }

    #[test]
    fn difficulty_ascends() {
        for catalog in both_catalogs() {
            for pair in catalog.levels().windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(
                    b.item_count() > a.item_count()
                        || b.missing_units_per_item() > a.missing_units_per_item(),
                    "level {} does not grow",
                    b.index
                );
                assert!(b.seconds_per_item() <= a.seconds_per_item());
                assert!(b.score_multiplier > a.score_multiplier);
            }
        }
    }

    #[test]
    fn memory_levels_match_board_sizes() {
        let catalog = LevelCatalog::for_mode(GameMode::Memory);
        let pairs: Vec<usize> = catalog.levels().iter().map(|l| l.item_count()).collect();
        assert_eq!(pairs, vec![2, 3, 6, 8, 10]);
        assert_eq!(catalog.get_level(0).unwrap().move_budget, Some(20));
        assert_eq!(catalog.get_level(0).unwrap().time_budget_secs, 60);
    }

    #[test]
    fn word_levels_carry_hint_cost_and_tier() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let last = catalog.get_level(4).unwrap();
        assert_eq!(last.hint_cost, 25);
        assert_matches!(
            last.shape,
            LevelShape::Words {
                item_count: 10,
                missing_per_item: 3,
                max_tier: 5
            }
        );
        assert!(catalog.is_last(4));
        assert!(!catalog.is_last(3));
    }

    #[test]
    fn mode_display_names() {
        assert_eq!(GameMode::Memory.to_string(), "memory");
        assert_eq!(GameMode::Words.to_string(), "words");
    }
}
