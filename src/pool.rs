use crate::error::{GameError, GameResult};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;

static POOL_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/pool");

/// A card face in memory match. Two slots with the same `group_key` form a pair.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CardSymbol {
    pub id: u32,
    pub glyph: String,
    pub name: String,
    pub group_key: String,
}

/// A word to complete in the word challenge.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub text: String,
    pub hint: String,
    pub category: String,
    pub tier: u8,
}

#[derive(Deserialize, Clone, Debug)]
struct CardFile {
    name: String,
    symbols: Vec<CardSymbol>,
}

#[derive(Deserialize, Clone, Debug)]
struct WordFile {
    name: String,
    words: Vec<WordEntry>,
}

/// Static, read-only catalogs that puzzles are drawn from.
#[derive(Clone, Debug, Default)]
pub struct ContentPool {
    pub symbols: Vec<CardSymbol>,
    pub words: Vec<WordEntry>,
}

impl ContentPool {
    /// Load the holiday catalogs compiled into the binary.
    pub fn embedded() -> GameResult<Self> {
        let cards: CardFile = read_pool_file("cards.json")?;
        let words: WordFile = read_pool_file("words.json")?;
        log::debug!(
            "loaded pools {} ({} symbols) and {} ({} words)",
            cards.name,
            cards.symbols.len(),
            words.name,
            words.words.len()
        );
        ensure_unique("card group", cards.symbols.iter().map(|s| s.group_key.as_str()))?;
        ensure_unique("word", words.words.iter().map(|w| w.text.as_str()))?;
        Ok(Self {
            symbols: cards.symbols,
            words: words.words,
        })
    }

    pub fn new(symbols: Vec<CardSymbol>, words: Vec<WordEntry>) -> Self {
        Self { symbols, words }
    }

    /// Words of exactly `tier`.
    pub fn words_in_tier(&self, tier: u8) -> impl Iterator<Item = &WordEntry> {
        self.words.iter().filter(move |w| w.tier == tier)
    }

    /// Words of `max_tier` or below.
    pub fn words_up_to_tier(&self, max_tier: u8) -> impl Iterator<Item = &WordEntry> {
        self.words.iter().filter(move |w| w.tier <= max_tier)
    }
}

/// Pairs are found by key and words must not repeat within a level.
fn ensure_unique<'a>(what: &str, keys: impl Iterator<Item = &'a str>) -> GameResult<()> {
    match keys.duplicates().next() {
        Some(dup) => Err(GameError::Pool(format!("duplicate {what} {dup:?}"))),
        None => Ok(()),
    }
}

fn read_pool_file<T: serde::de::DeserializeOwned>(file_name: &str) -> GameResult<T> {
    let file = POOL_DIR
        .get_file(file_name)
        .ok_or_else(|| GameError::Pool(format!("{file_name} not found")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| GameError::Pool(format!("{file_name} is not utf-8")))?;

    from_str(file_as_str).map_err(|e| GameError::Pool(format!("{file_name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn embedded_pools_load() {
        let pool = ContentPool::embedded().unwrap();

        assert_eq!(pool.symbols.len(), 15);
        assert_eq!(pool.words.len(), 40);
    }

    #[test]
    fn group_keys_are_unique() {
        let pool = ContentPool::embedded().unwrap();
        let keys: HashSet<&str> = pool.symbols.iter().map(|s| s.group_key.as_str()).collect();

        assert_eq!(keys.len(), pool.symbols.len());
    }

    #[test]
    fn every_level_tier_is_populated() {
        let pool = ContentPool::embedded().unwrap();

        for tier in 1..=5 {
            assert_eq!(pool.words_in_tier(tier).count(), 8, "tier {tier}");
        }
        assert_eq!(pool.words_up_to_tier(2).count(), 16);
    }

    #[test]
    fn words_are_uppercase() {
        let pool = ContentPool::embedded().unwrap();

        for w in &pool.words {
            assert!(w
                .text
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == ' ' || c == '-'));
        }
    }

    #[test]
    fn word_entry_deserialization() {
        let json_data = r#"{ "text": "SNOW", "hint": "cold", "category": "Weather", "tier": 1 }"#;

        let entry: WordEntry = from_str(json_data).unwrap();

        assert_eq!(entry.text, "SNOW");
        assert_eq!(entry.tier, 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(ensure_unique("word", ["SNOW", "STAR"].into_iter()).is_ok());
        assert_eq!(
            ensure_unique("word", ["SNOW", "STAR", "SNOW"].into_iter()),
            Err(GameError::Pool("duplicate word \"SNOW\"".into()))
        );
    }

    #[test]
    fn missing_pool_file_is_an_error() {
        let result: GameResult<WordFile> = read_pool_file("nonexistent.json");
        assert!(matches!(result, Err(GameError::Pool(_))));
    }
}
