use crate::pool::{CardSymbol, WordEntry};
use std::collections::{BTreeMap, BTreeSet};

/// One face-down card on the memory board.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSlot {
    pub symbol: CardSymbol,
    pub revealed: bool,
    pub matched: bool,
}

impl CardSlot {
    pub fn new(symbol: CardSymbol) -> Self {
        Self {
            symbol,
            revealed: false,
            matched: false,
        }
    }

    pub fn group_key(&self) -> &str {
        &self.symbol.group_key
    }
}

/// Shuffled memory board, two slots per symbol group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchPuzzle {
    pub slots: Vec<CardSlot>,
}

impl MatchPuzzle {
    pub fn pair_count(&self) -> usize {
        self.slots.len() / 2
    }

    /// Indices of cards that are face-up but not yet matched.
    pub fn face_up(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.revealed && !s.matched)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn matched_pairs(&self) -> usize {
        self.slots.iter().filter(|s| s.matched).count() / 2
    }

    pub fn is_solved(&self) -> bool {
        self.slots.iter().all(|s| s.matched)
    }
}

/// Per-letter display state in the word challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterState {
    /// Always shown.
    Fixed,
    /// Missing; may hold a tentative player letter.
    Hidden,
    Correct,
    Incorrect,
    /// Filled in by a hint.
    Hinted,
}

/// A word with some letters blanked out, plus the player's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSlot {
    pub source: WordEntry,
    pub letters: Vec<char>,
    pub hidden: BTreeSet<usize>,
    pub user_letters: BTreeMap<usize, char>,
    pub states: Vec<LetterState>,
    pub hint_used: bool,
    pub solved: bool,
}

/// Spaces and hyphens are never hidden.
pub fn is_hideable(c: char) -> bool {
    c != ' ' && c != '-'
}

impl WordSlot {
    pub fn new(source: WordEntry, hidden: BTreeSet<usize>) -> Self {
        let letters: Vec<char> = source.text.chars().collect();
        let states = (0..letters.len())
            .map(|i| {
                if hidden.contains(&i) {
                    LetterState::Hidden
                } else {
                    LetterState::Fixed
                }
            })
            .collect();

        Self {
            source,
            letters,
            hidden,
            user_letters: BTreeMap::new(),
            states,
            hint_used: false,
            solved: false,
        }
    }

    /// Hidden positions the player may still type into.
    pub fn is_editable(&self, pos: usize) -> bool {
        self.hidden.contains(&pos) && self.states[pos] != LetterState::Hinted
    }

    pub fn all_filled(&self) -> bool {
        self.hidden.iter().all(|p| self.user_letters.contains_key(p))
    }

    /// The word as currently filled in, `_` for blanks.
    pub fn assembled(&self) -> String {
        self.letters
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if self.hidden.contains(&i) {
                    self.user_letters.get(&i).copied().unwrap_or('_')
                } else {
                    c
                }
            })
            .collect()
    }

    pub fn is_correct(&self) -> bool {
        self.hidden
            .iter()
            .all(|p| self.user_letters.get(p) == Some(&self.letters[*p]))
    }

    /// Hidden positions that are empty or hold a wrong letter.
    pub fn unsolved_positions(&self) -> Vec<usize> {
        self.hidden
            .iter()
            .copied()
            .filter(|p| self.user_letters.get(p) != Some(&self.letters[*p]))
            .collect()
    }

    pub fn first_editable(&self) -> Option<usize> {
        self.hidden.iter().copied().find(|&p| self.is_editable(p))
    }

    pub fn next_editable_after(&self, pos: usize) -> Option<usize> {
        self.hidden
            .range(pos + 1..)
            .copied()
            .find(|&p| self.is_editable(p))
    }

    pub fn prev_editable_before(&self, pos: usize) -> Option<usize> {
        self.hidden
            .range(..pos)
            .rev()
            .copied()
            .find(|&p| self.is_editable(p))
    }

    /// Grade every non-hinted hidden letter after a check.
    pub fn mark(&mut self) {
        for &p in &self.hidden {
            if self.states[p] == LetterState::Hinted {
                continue;
            }
            self.states[p] = if self.user_letters.get(&p) == Some(&self.letters[p]) {
                LetterState::Correct
            } else {
                LetterState::Incorrect
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordPuzzle {
    pub words: Vec<WordSlot>,
}

/// A generated level board for either game.
#[derive(Debug, Clone, PartialEq)]
pub enum Puzzle {
    Match(MatchPuzzle),
    Word(WordPuzzle),
}

impl Puzzle {
    /// Pairs or words to clear.
    pub fn item_count(&self) -> usize {
        match self {
            Puzzle::Match(m) => m.pair_count(),
            Puzzle::Word(w) => w.words.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(text: &str, hidden: &[usize]) -> WordSlot {
        WordSlot::new(
            WordEntry {
                text: text.to_string(),
                hint: String::new(),
                category: String::new(),
                tier: 1,
            },
            hidden.iter().copied().collect(),
        )
    }

    #[test]
    fn new_word_slot_states() {
        let w = slot("SNOW", &[1]);

        assert_eq!(
            w.states,
            vec![
                LetterState::Fixed,
                LetterState::Hidden,
                LetterState::Fixed,
                LetterState::Fixed
            ]
        );
        assert_eq!(w.assembled(), "S_OW");
        assert!(!w.all_filled());
    }

    #[test]
    fn correctness_follows_user_letters() {
        let mut w = slot("SNOW", &[1, 3]);
        w.user_letters.insert(1, 'N');
        assert!(!w.is_correct());
        assert_eq!(w.unsolved_positions(), vec![3]);

        w.user_letters.insert(3, 'X');
        assert!(w.all_filled());
        assert!(!w.is_correct());

        w.mark();
        assert_eq!(w.states[1], LetterState::Correct);
        assert_eq!(w.states[3], LetterState::Incorrect);
    }

    #[test]
    fn editable_navigation_skips_hinted() {
        let mut w = slot("REINDEER", &[0, 3, 5]);
        w.states[3] = LetterState::Hinted;

        assert_eq!(w.first_editable(), Some(0));
        assert_eq!(w.next_editable_after(0), Some(5));
        assert_eq!(w.prev_editable_before(5), Some(0));
        assert_eq!(w.next_editable_after(5), None);
    }

    #[test]
    fn hideable_characters() {
        assert!(is_hideable('A'));
        assert!(!is_hideable(' '));
        assert!(!is_hideable('-'));
    }

    #[test]
    fn match_puzzle_face_up_excludes_matched() {
        let symbol = CardSymbol {
            id: 1,
            glyph: "*".into(),
            name: "Star".into(),
            group_key: "star".into(),
        };
        let mut m = MatchPuzzle {
            slots: vec![CardSlot::new(symbol.clone()), CardSlot::new(symbol)],
        };
        m.slots[0].revealed = true;
        assert_eq!(m.face_up(), vec![0]);

        m.slots[1].revealed = true;
        m.slots[0].matched = true;
        m.slots[1].matched = true;
        assert!(m.face_up().is_empty());
        assert!(m.is_solved());
        assert_eq!(m.matched_pairs(), 1);
    }
}
