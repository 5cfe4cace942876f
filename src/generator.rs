use crate::{
    level::{LevelDefinition, LevelShape},
    pool::{ContentPool, WordEntry},
    puzzle::{is_hideable, CardSlot, MatchPuzzle, Puzzle, WordPuzzle, WordSlot},
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::BTreeSet;

/// Share of a word level drawn from the next tier up.
const NEXT_TIER_SHARE: f64 = 0.3;

const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

/// Trait for choosing which letters of a word to hide
pub trait LetterSelector {
    /// Pick up to `count` positions of `letters`, never a space or hyphen.
    fn select_positions(
        &self,
        letters: &[char],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> BTreeSet<usize>;
}

/// Every eligible letter equally likely
pub struct UniformLetters;

impl LetterSelector for UniformLetters {
    fn select_positions(
        &self,
        letters: &[char],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> BTreeSet<usize> {
        let eligible = eligible_positions(letters);
        let count = clamp_hidden(count, eligible.len());
        eligible.choose_multiple(rng, count).copied().collect()
    }
}

/// Hide consonants before touching any vowel
pub struct ConsonantsFirst;

impl LetterSelector for ConsonantsFirst {
    fn select_positions(
        &self,
        letters: &[char],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> BTreeSet<usize> {
        let eligible = eligible_positions(letters);
        let count = clamp_hidden(count, eligible.len());

        let (mut consonants, mut vowels): (Vec<usize>, Vec<usize>) = eligible
            .into_iter()
            .partition(|&p| !VOWELS.contains(&letters[p].to_ascii_uppercase()));
        consonants.shuffle(rng);
        vowels.shuffle(rng);

        consonants.into_iter().chain(vowels).take(count).collect()
    }
}

fn eligible_positions(letters: &[char]) -> Vec<usize> {
    letters
        .iter()
        .enumerate()
        .filter(|(_, &c)| is_hideable(c))
        .map(|(i, _)| i)
        .collect()
}

/// At least one eligible letter always stays visible.
fn clamp_hidden(requested: usize, eligible: usize) -> usize {
    requested.min(eligible.saturating_sub(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterStrategy {
    #[default]
    Uniform,
    ConsonantsFirst,
}

impl LetterStrategy {
    fn selector(&self) -> Box<dyn LetterSelector> {
        match self {
            LetterStrategy::Uniform => Box::new(UniformLetters),
            LetterStrategy::ConsonantsFirst => Box::new(ConsonantsFirst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub blend_next_tier: bool,
    pub strategy: LetterStrategy,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            blend_next_tier: true,
            strategy: LetterStrategy::Uniform,
        }
    }
}

/// Builds randomized puzzles from a level and a content pool
pub struct PuzzleGenerator<R: Rng = StdRng> {
    rng: R,
    options: GeneratorOptions,
}

impl PuzzleGenerator<StdRng> {
    pub fn from_entropy(options: GeneratorOptions) -> Self {
        Self::new(StdRng::from_entropy(), options)
    }

    pub fn seeded(seed: u64, options: GeneratorOptions) -> Self {
        Self::new(StdRng::seed_from_u64(seed), options)
    }
}

impl<R: Rng> PuzzleGenerator<R> {
    pub fn new(rng: R, options: GeneratorOptions) -> Self {
        Self { rng, options }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn generate(&mut self, level: &LevelDefinition, pool: &ContentPool) -> Puzzle {
        match level.shape {
            LevelShape::Pairs { pair_count } => {
                Puzzle::Match(self.generate_match(pair_count, pool))
            }
            LevelShape::Words {
                item_count,
                missing_per_item,
                max_tier,
            } => Puzzle::Word(self.generate_words(item_count, missing_per_item, max_tier, pool)),
        }
    }

    fn generate_match(&mut self, pair_count: usize, pool: &ContentPool) -> MatchPuzzle {
        if pool.symbols.len() < pair_count {
            debug!(
                "symbol pool has {} entries, {} pairs requested",
                pool.symbols.len(),
                pair_count
            );
        }

        let mut slots: Vec<CardSlot> = pool
            .symbols
            .iter()
            .take(pair_count)
            .flat_map(|s| [CardSlot::new(s.clone()), CardSlot::new(s.clone())])
            .collect();
        slots.shuffle(&mut self.rng);

        MatchPuzzle { slots }
    }

    fn generate_words(
        &mut self,
        item_count: usize,
        missing_per_item: usize,
        max_tier: u8,
        pool: &ContentPool,
    ) -> WordPuzzle {
        let selector = self.options.strategy.selector();
        let entries = self.select_words(item_count, max_tier, pool);

        let words = entries
            .into_iter()
            .map(|entry| {
                let letters: Vec<char> = entry.text.chars().collect();
                let hidden = selector.select_positions(&letters, missing_per_item, &mut self.rng);
                debug!("hiding {:?} in {}", hidden, entry.text);
                WordSlot::new(entry, hidden)
            })
            .collect();

        WordPuzzle { words }
    }

    fn select_words(&mut self, item_count: usize, max_tier: u8, pool: &ContentPool) -> Vec<WordEntry> {
        let mut picked: Vec<WordEntry> = Vec::with_capacity(item_count);

        if self.options.blend_next_tier {
            let quota = (item_count as f64 * NEXT_TIER_SHARE).floor() as usize;
            let next_tier: Vec<&WordEntry> =
                pool.words_in_tier(max_tier.saturating_add(1)).collect();
            picked.extend(
                next_tier
                    .choose_multiple(&mut self.rng, quota)
                    .map(|w| (*w).clone()),
            );
        }

        let eligible: Vec<&WordEntry> = pool.words_up_to_tier(max_tier).collect();
        let remaining = item_count.saturating_sub(picked.len());
        picked.extend(
            eligible
                .choose_multiple(&mut self.rng, remaining)
                .map(|w| (*w).clone()),
        );

        if picked.len() < item_count {
            debug!(
                "word pool exhausted at tier {}: {} of {} words",
                max_tier,
                picked.len(),
                item_count
            );
        }

        picked.shuffle(&mut self.rng);
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{GameMode, LevelCatalog};
    use crate::puzzle::LetterState;
    use std::collections::{HashMap, HashSet};

    fn pool() -> ContentPool {
        ContentPool::embedded().unwrap()
    }

    fn word(text: &str, tier: u8) -> WordEntry {
        WordEntry {
            text: text.to_string(),
            hint: String::new(),
            category: String::new(),
            tier,
        }
    }

    #[test]
    fn match_puzzles_hold_each_symbol_twice() {
        let catalog = LevelCatalog::for_mode(GameMode::Memory);
        let pool = pool();

        for seed in 0..20 {
            let mut generator = PuzzleGenerator::seeded(seed, GeneratorOptions::default());
            for level in catalog.levels() {
                let Puzzle::Match(m) = generator.generate(level, &pool) else {
                    panic!("expected a match puzzle");
                };
                assert_eq!(m.slots.len(), 2 * level.item_count());

                let mut counts: HashMap<&str, usize> = HashMap::new();
                for slot in &m.slots {
                    *counts.entry(slot.group_key()).or_default() += 1;
                    assert!(!slot.revealed);
                    assert!(!slot.matched);
                }
                assert!(counts.values().all(|&n| n == 2));
            }
        }
    }

    #[test]
    fn match_puzzle_uses_catalog_order() {
        let catalog = LevelCatalog::for_mode(GameMode::Memory);
        let pool = pool();
        let mut generator = PuzzleGenerator::seeded(7, GeneratorOptions::default());

        let Puzzle::Match(m) = generator.generate(catalog.get_level(0).unwrap(), &pool) else {
            panic!("expected a match puzzle");
        };
        let keys: HashSet<&str> = m.slots.iter().map(|s| s.group_key()).collect();
        assert_eq!(keys, HashSet::from(["santa", "tree"]));
    }

    #[test]
    fn small_symbol_pool_degrades() {
        let catalog = LevelCatalog::for_mode(GameMode::Memory);
        let mut small = pool();
        small.symbols.truncate(4);
        let mut generator = PuzzleGenerator::seeded(1, GeneratorOptions::default());

        let puzzle = generator.generate(catalog.get_level(4).unwrap(), &small);
        assert_eq!(puzzle.item_count(), 4);
    }

    #[test]
    fn word_puzzles_hide_the_clamped_count() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let pool = pool();

        for strategy in [LetterStrategy::Uniform, LetterStrategy::ConsonantsFirst] {
            for seed in 0..20 {
                let options = GeneratorOptions {
                    blend_next_tier: true,
                    strategy,
                };
                let mut generator = PuzzleGenerator::seeded(seed, options);
                for level in catalog.levels() {
                    let Puzzle::Word(w) = generator.generate(level, &pool) else {
                        panic!("expected a word puzzle");
                    };
                    for slot in &w.words {
                        let eligible = slot.letters.iter().filter(|&&c| is_hideable(c)).count();
                        assert_eq!(
                            slot.hidden.len(),
                            level.missing_units_per_item().min(eligible - 1)
                        );
                        for &p in &slot.hidden {
                            assert!(is_hideable(slot.letters[p]));
                            assert_eq!(slot.states[p], LetterState::Hidden);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn word_puzzles_never_repeat_and_respect_tiers() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let pool = pool();

        for seed in 0..20 {
            let options = GeneratorOptions {
                blend_next_tier: false,
                strategy: LetterStrategy::Uniform,
            };
            let mut generator = PuzzleGenerator::seeded(seed, options);
            for level in catalog.levels() {
                let Puzzle::Word(w) = generator.generate(level, &pool) else {
                    panic!("expected a word puzzle");
                };
                assert_eq!(w.words.len(), level.item_count());
                let texts: HashSet<&str> = w.words.iter().map(|s| s.source.text.as_str()).collect();
                assert_eq!(texts.len(), w.words.len());
                assert!(w.words.iter().all(|s| s.source.tier <= level.index as u8 + 1));
            }
        }
    }

    #[test]
    fn blending_draws_from_the_next_tier() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let pool = pool();
        let mut generator = PuzzleGenerator::seeded(3, GeneratorOptions::default());

        // 6 words at level 2, floor(6 * 0.3) = 1 comes from tier 3
        let level = catalog.get_level(1).unwrap();
        let Puzzle::Word(w) = generator.generate(level, &pool) else {
            panic!("expected a word puzzle");
        };
        let next_tier = w.words.iter().filter(|s| s.source.tier == 3).count();
        assert_eq!(next_tier, 1);
        let texts: HashSet<&str> = w.words.iter().map(|s| s.source.text.as_str()).collect();
        assert_eq!(texts.len(), 6);
    }

    #[test]
    fn word_pool_exhaustion_returns_what_exists() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let tiny = ContentPool::new(vec![], vec![word("SNOW", 1), word("GIFT", 1)]);
        let mut generator = PuzzleGenerator::seeded(9, GeneratorOptions::default());

        let puzzle = generator.generate(catalog.get_level(0).unwrap(), &tiny);
        assert_eq!(puzzle.item_count(), 2);
    }

    #[test]
    fn consonants_hidden_before_vowels() {
        let letters: Vec<char> = "SANTA".chars().collect();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let hidden = ConsonantsFirst.select_positions(&letters, 3, &mut rng);
            assert_eq!(hidden, BTreeSet::from([0, 2, 3]));
        }
    }

    #[test]
    fn short_words_keep_one_letter_visible() {
        let letters: Vec<char> = "HO HO".chars().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let hidden = UniformLetters.select_positions(&letters, 10, &mut rng);
        assert_eq!(hidden.len(), 3);
        assert!(!hidden.contains(&2));
    }

    #[test]
    fn same_seed_same_puzzle() {
        let catalog = LevelCatalog::for_mode(GameMode::Words);
        let pool = pool();
        let level = catalog.get_level(2).unwrap();

        let a = PuzzleGenerator::seeded(42, GeneratorOptions::default()).generate(level, &pool);
        let b = PuzzleGenerator::seeded(42, GeneratorOptions::default()).generate(level, &pool);
        assert_eq!(a, b);
    }
}
