use crate::{
    error::{GameError, GameResult},
    generator::{GeneratorOptions, LetterStrategy, PuzzleGenerator},
    level::{GameMode, LevelCatalog, LevelDefinition},
    pool::ContentPool,
    puzzle::{LetterState, MatchPuzzle, Puzzle, WordPuzzle, WordSlot},
    scoring::{self, Difficulty, MatchContext, WordContext},
    timer::{Countdown, TickOutcome},
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

pub const MATCH_HOLD: Duration = Duration::from_millis(500);
pub const MISMATCH_HOLD: Duration = Duration::from_millis(1000);
pub const WORD_FEEDBACK_HOLD: Duration = Duration::from_millis(1500);
pub const PEEK_HOLD: Duration = Duration::from_millis(2000);
/// Moves spent per peek. A peek needs more than this many left.
pub const PEEK_MOVE_COST: u32 = 5;
pub const EXTRA_TIME_SECS: u32 = 15;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Zen mode: the clock never runs down.
    pub untimed: bool,
    pub blend_next_tier: bool,
}

impl SessionConfig {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            difficulty: Difficulty::default(),
            untimed: false,
            blend_next_tier: true,
        }
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            blend_next_tier: self.blend_next_tier,
            strategy: match self.difficulty {
                Difficulty::Hard => LetterStrategy::ConsonantsFirst,
                _ => LetterStrategy::Uniform,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUp {
    ExtraTime,
}

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FlipCard(usize),
    EnterLetter { word: usize, pos: usize, letter: char },
    ClearLetter { word: usize, pos: usize },
    MoveCursor(CursorMove),
    RequestCheck,
    RequestHint,
    UsePowerUp(PowerUp),
}

/// What is being shown while input is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Pair { first: usize, second: usize },
    Word { points: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub hold: Duration,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub level_index: usize,
    /// Added to the score by `complete_level`.
    pub bonus: u32,
    pub is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub level_index: usize,
    pub levels_cleared: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Playing,
    Paused,
    /// All unmatched cards shown for a moment.
    Peeking(Duration),
    Correct(Pending),
    Incorrect(Pending),
    LevelComplete(LevelSummary),
    GameComplete(RunSummary),
    Timeout(RunSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PhaseKind {
    Idle,
    Playing,
    Paused,
    Peeking,
    Correct,
    Incorrect,
    LevelComplete,
    GameComplete,
    Timeout,
}

impl GamePhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            GamePhase::Idle => PhaseKind::Idle,
            GamePhase::Playing => PhaseKind::Playing,
            GamePhase::Paused => PhaseKind::Paused,
            GamePhase::Peeking(_) => PhaseKind::Peeking,
            GamePhase::Correct(_) => PhaseKind::Correct,
            GamePhase::Incorrect(_) => PhaseKind::Incorrect,
            GamePhase::LevelComplete(_) => PhaseKind::LevelComplete,
            GamePhase::GameComplete(_) => PhaseKind::GameComplete,
            GamePhase::Timeout(_) => PhaseKind::Timeout,
        }
    }

    /// Ended runs; only `start` leaves these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameComplete(_) | GamePhase::Timeout(_))
    }

    fn hold_mut(&mut self) -> Option<&mut Duration> {
        match self {
            GamePhase::Peeking(hold) => Some(hold),
            GamePhase::Correct(p) | GamePhase::Incorrect(p) => Some(&mut p.hold),
            _ => None,
        }
    }
}

/// Everything that changes during a run
#[derive(Debug, Clone)]
pub struct SessionState {
    pub level_index: usize,
    pub score: u32,
    pub streak: u32,
    pub combo: u32,
    pub matches: usize,
    pub moves_left: Option<u32>,
    pub hints_used: u32,
    pub word_index: usize,
    pub word_seconds: u32,
    pub cursor: Option<usize>,
    pub extra_time_used: bool,
    /// Points from the most recent match or word.
    pub last_award: Option<u32>,
    pub clock: Countdown,
    pub puzzle: Option<Puzzle>,
    pub phase: GamePhase,
}

impl SessionState {
    fn new(untimed: bool) -> Self {
        Self {
            level_index: 0,
            score: 0,
            streak: 0,
            combo: 0,
            matches: 0,
            moves_left: None,
            hints_used: 0,
            word_index: 0,
            word_seconds: 0,
            cursor: None,
            extra_time_used: false,
            last_award: None,
            clock: Countdown::new(untimed),
            puzzle: None,
            phase: GamePhase::Idle,
        }
    }

    pub fn match_puzzle(&self) -> Option<&MatchPuzzle> {
        match &self.puzzle {
            Some(Puzzle::Match(m)) => Some(m),
            _ => None,
        }
    }

    pub fn word_puzzle(&self) -> Option<&WordPuzzle> {
        match &self.puzzle {
            Some(Puzzle::Word(w)) => Some(w),
            _ => None,
        }
    }

    pub fn current_word(&self) -> Option<&WordSlot> {
        self.word_puzzle().and_then(|w| w.words.get(self.word_index))
    }

    fn match_puzzle_mut(&mut self) -> GameResult<&mut MatchPuzzle> {
        match &mut self.puzzle {
            Some(Puzzle::Match(m)) => Ok(m),
            _ => Err(GameError::InvalidAction("not a memory game")),
        }
    }

    fn current_word_mut(&mut self) -> GameResult<&mut WordSlot> {
        match &mut self.puzzle {
            Some(Puzzle::Word(w)) => w
                .words
                .get_mut(self.word_index)
                .ok_or(GameError::InvalidAction("no current word")),
            _ => Err(GameError::InvalidAction("not a word game")),
        }
    }

    fn run_summary(&self, levels_cleared: usize) -> RunSummary {
        RunSummary {
            score: self.score,
            level_index: self.level_index,
            levels_cleared,
        }
    }
}

/// Input to the session reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Start,
    Action(Action),
    Tick,
    Elapsed(Duration),
    Settle,
    CompleteLevel,
    Pause,
    Resume,
    Dispose,
}

/// One run of a mini-game: level progression, scoring and timing.
pub struct Session<R: Rng = StdRng> {
    config: SessionConfig,
    catalog: LevelCatalog,
    pool: ContentPool,
    generator: PuzzleGenerator<R>,
    state: SessionState,
}

impl Session<StdRng> {
    pub fn new(config: SessionConfig, pool: ContentPool) -> Self {
        let generator = PuzzleGenerator::from_entropy(config.generator_options());
        Self::with_generator(config, pool, generator)
    }

    pub fn seeded(config: SessionConfig, pool: ContentPool, seed: u64) -> Self {
        let generator = PuzzleGenerator::seeded(seed, config.generator_options());
        Self::with_generator(config, pool, generator)
    }
}

impl<R: Rng> Session<R> {
    pub fn with_generator(
        config: SessionConfig,
        pool: ContentPool,
        generator: PuzzleGenerator<R>,
    ) -> Self {
        Self {
            catalog: LevelCatalog::for_mode(config.mode),
            state: SessionState::new(config.untimed),
            config,
            pool,
            generator,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.catalog.mode()
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> &GamePhase {
        &self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.clock.remaining()
    }

    pub fn level(&self) -> Option<&'static LevelDefinition> {
        self.catalog.get_level(self.state.level_index).ok()
    }

    pub fn start(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Start)
    }

    pub fn submit(&mut self, action: Action) -> GameResult<PhaseKind> {
        self.dispatch(Event::Action(action))
    }

    pub fn tick(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Tick)
    }

    pub fn advance(&mut self, dt: Duration) -> GameResult<PhaseKind> {
        self.dispatch(Event::Elapsed(dt))
    }

    pub fn settle(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Settle)
    }

    pub fn complete_level(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::CompleteLevel)
    }

    pub fn pause(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Pause)
    }

    pub fn resume(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Resume)
    }

    pub fn dispose(&mut self) -> GameResult<PhaseKind> {
        self.dispatch(Event::Dispose)
    }

    /// Single entry point for every state change. Rejected events leave the state untouched.
    pub fn dispatch(&mut self, event: Event) -> GameResult<PhaseKind> {
        let before = self.state.phase.kind();
        match event {
            Event::Start => self.on_start()?,
            Event::Action(action) => self.on_action(action)?,
            Event::Tick => self.on_tick(),
            Event::Elapsed(dt) => self.on_elapsed(dt)?,
            Event::Settle => self.resolve_pending()?,
            Event::CompleteLevel => self.on_complete_level()?,
            Event::Pause => self.on_pause()?,
            Event::Resume => self.on_resume()?,
            Event::Dispose => self.on_dispose(),
        }
        let after = self.state.phase.kind();
        if before != after {
            debug!("{} -> {} on {:?}", before, after, event);
        }
        Ok(after)
    }

    fn on_start(&mut self) -> GameResult<()> {
        self.on_dispose();
        self.state = SessionState::new(self.config.untimed);
        info!(
            "starting {} game ({} difficulty{})",
            self.config.mode,
            self.config.difficulty,
            if self.config.untimed { ", zen" } else { "" }
        );
        self.load_level(0)
    }

    fn load_level(&mut self, index: usize) -> GameResult<()> {
        let level = self.catalog.get_level(index)?;
        let puzzle = self.generator.generate(level, &self.pool);

        let state = &mut self.state;
        state.level_index = index;
        state.combo = 0;
        state.matches = 0;
        state.moves_left = level.move_budget;
        state.word_index = 0;
        state.word_seconds = 0;
        state.extra_time_used = false;
        state.last_award = None;
        state.cursor = match &puzzle {
            Puzzle::Word(w) => w.words.first().and_then(|s| s.first_editable()),
            Puzzle::Match(_) => None,
        };
        let empty = puzzle.item_count() == 0;
        state.puzzle = Some(puzzle);
        state.clock.start(level.time_budget_secs);
        state.phase = GamePhase::Playing;
        info!(
            "level {} ({}) loaded, {}s on the clock",
            index + 1,
            level.difficulty_label,
            level.time_budget_secs
        );

        if empty {
            self.enter_level_complete();
        }
        Ok(())
    }

    fn on_action(&mut self, action: Action) -> GameResult<()> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::InvalidAction("not accepting input"));
        }
        match action {
            Action::FlipCard(index) => self.flip_card(index),
            Action::EnterLetter { word, pos, letter } => self.enter_letter(word, pos, letter),
            Action::ClearLetter { word, pos } => self.clear_letter(word, pos),
            Action::MoveCursor(dir) => self.move_cursor(dir),
            Action::RequestCheck => self.request_check(),
            Action::RequestHint => match self.config.mode {
                GameMode::Memory => self.peek(),
                GameMode::Words => self.reveal_hint(),
            },
            Action::UsePowerUp(PowerUp::ExtraTime) => self.extra_time(),
        }
    }

    fn flip_card(&mut self, index: usize) -> GameResult<()> {
        if self.state.moves_left == Some(0) {
            return Err(GameError::InvalidAction("no moves left"));
        }

        let m = self.state.match_puzzle_mut()?;
        let face_up = m.face_up();
        let slot = m
            .slots
            .get(index)
            .ok_or(GameError::InvalidAction("no such card"))?;
        if slot.matched {
            return Err(GameError::InvalidAction("card already matched"));
        }
        if slot.revealed {
            return Err(GameError::InvalidAction("card already face-up"));
        }
        if face_up.len() >= 2 {
            return Err(GameError::InvalidAction("evaluation pending"));
        }

        m.slots[index].revealed = true;
        let Some(&first) = face_up.first() else {
            return Ok(());
        };
        let same = m.slots[first].group_key() == m.slots[index].group_key();

        self.state.moves_left = self.state.moves_left.map(|n| n.saturating_sub(1));
        let evaluation = Evaluation::Pair {
            first,
            second: index,
        };
        self.state.phase = if same {
            GamePhase::Correct(Pending {
                hold: MATCH_HOLD,
                evaluation,
            })
        } else {
            GamePhase::Incorrect(Pending {
                hold: MISMATCH_HOLD,
                evaluation,
            })
        };
        Ok(())
    }

    fn peek(&mut self) -> GameResult<()> {
        let moves = self.state.moves_left.unwrap_or(0);
        if moves <= PEEK_MOVE_COST {
            return Err(GameError::InvalidAction("not enough moves to peek"));
        }

        let m = self.state.match_puzzle_mut()?;
        for slot in m.slots.iter_mut().filter(|s| !s.matched) {
            slot.revealed = true;
        }
        self.state.moves_left = Some(moves - PEEK_MOVE_COST);
        self.state.hints_used += 1;
        self.state.phase = GamePhase::Peeking(PEEK_HOLD);
        Ok(())
    }

    fn enter_letter(&mut self, word: usize, pos: usize, letter: char) -> GameResult<()> {
        if word != self.state.word_index {
            return Err(GameError::InvalidAction("not the current word"));
        }
        if !letter.is_ascii_alphabetic() {
            return Err(GameError::InvalidAction("letters only"));
        }

        let slot = self.state.current_word_mut()?;
        if !slot.is_editable(pos) {
            return Err(GameError::InvalidAction("position is not editable"));
        }
        slot.user_letters.insert(pos, letter.to_ascii_uppercase());
        slot.states[pos] = LetterState::Hidden;
        let next = slot.next_editable_after(pos).unwrap_or(pos);
        let filled = slot.all_filled();

        self.state.cursor = Some(next);
        if filled {
            self.request_check()?;
        }
        Ok(())
    }

    fn clear_letter(&mut self, word: usize, pos: usize) -> GameResult<()> {
        if word != self.state.word_index {
            return Err(GameError::InvalidAction("not the current word"));
        }

        let slot = self.state.current_word_mut()?;
        if !slot.is_editable(pos) {
            return Err(GameError::InvalidAction("position is not editable"));
        }
        slot.user_letters.remove(&pos);
        slot.states[pos] = LetterState::Hidden;
        self.state.cursor = Some(pos);
        Ok(())
    }

    fn move_cursor(&mut self, dir: CursorMove) -> GameResult<()> {
        let cursor = self.state.cursor;
        let slot = self.state.current_word_mut()?;
        let target = match (dir, cursor) {
            (_, None) => slot.first_editable(),
            (CursorMove::Left, Some(c)) => slot.prev_editable_before(c),
            (CursorMove::Right, Some(c)) => slot.next_editable_after(c),
        };
        let target = target.ok_or(GameError::InvalidAction("no editable letter that way"))?;
        self.state.cursor = Some(target);
        Ok(())
    }

    fn request_check(&mut self) -> GameResult<()> {
        let level = self.catalog.get_level(self.state.level_index)?;
        let slot = self.state.current_word_mut()?;
        if slot.solved {
            return Err(GameError::InvalidAction("word already solved"));
        }

        slot.mark();
        if slot.is_correct() {
            slot.solved = true;
            let hint_used = slot.hint_used;
            self.state.streak += 1;

            let points = scoring::word_points(&WordContext {
                level_index: self.state.level_index,
                streak: self.state.streak,
                seconds_on_word: self.word_scoring_secs(),
                hint_used,
                hint_cost: level.hint_cost,
                level_multiplier: level.score_multiplier,
                difficulty: self.config.difficulty,
            });
            self.state.score += points;
            self.state.last_award = Some(points);
            self.state.phase = GamePhase::Correct(Pending {
                hold: WORD_FEEDBACK_HOLD,
                evaluation: Evaluation::Word { points },
            });
            debug!("word solved for {} points", points);
        } else {
            self.state.streak = 0;
            self.state.last_award = None;
            if self.state.clock.penalize(level.wrong_answer_penalty_secs) == TickOutcome::Expired {
                self.enter_timeout();
                return Ok(());
            }
            self.state.phase = GamePhase::Incorrect(Pending {
                hold: WORD_FEEDBACK_HOLD,
                evaluation: Evaluation::Word { points: 0 },
            });
        }
        Ok(())
    }

    fn reveal_hint(&mut self) -> GameResult<()> {
        let cursor = self.state.cursor;
        let slot = match &mut self.state.puzzle {
            Some(Puzzle::Word(w)) => w
                .words
                .get_mut(self.state.word_index)
                .ok_or(GameError::InvalidAction("no current word"))?,
            _ => return Err(GameError::InvalidAction("not a word game")),
        };
        if slot.hint_used {
            return Err(GameError::InvalidAction("hint already used on this word"));
        }
        let unsolved: Vec<usize> = slot
            .unsolved_positions()
            .into_iter()
            .filter(|&p| slot.is_editable(p))
            .collect();
        let &pos = unsolved
            .choose(self.generator.rng_mut())
            .ok_or(GameError::InvalidAction("nothing left to reveal"))?;

        slot.user_letters.insert(pos, slot.letters[pos]);
        slot.states[pos] = LetterState::Hinted;
        slot.hint_used = true;
        let moved = if cursor == Some(pos) {
            slot.next_editable_after(pos).or_else(|| slot.first_editable())
        } else {
            cursor
        };

        self.state.cursor = moved;
        self.state.hints_used += 1;
        Ok(())
    }

    fn extra_time(&mut self) -> GameResult<()> {
        if self.state.clock.is_untimed() {
            return Err(GameError::InvalidAction("untimed game"));
        }
        if self.state.extra_time_used {
            return Err(GameError::InvalidAction("extra time already used this level"));
        }
        self.state.clock.add(EXTRA_TIME_SECS);
        self.state.extra_time_used = true;
        Ok(())
    }

    fn on_tick(&mut self) {
        if !self.state.clock.is_running() {
            return;
        }
        if matches!(
            self.state.phase,
            GamePhase::Playing | GamePhase::Correct(_) | GamePhase::Incorrect(_)
        ) {
            self.state.word_seconds += 1;
        }
        if self.state.clock.tick() == TickOutcome::Expired {
            self.enter_timeout();
        }
    }

    fn on_elapsed(&mut self, dt: Duration) -> GameResult<()> {
        if let Some(hold) = self.state.phase.hold_mut() {
            *hold = hold.saturating_sub(dt);
            if hold.is_zero() {
                self.resolve_pending()?;
            }
        }

        let secs = self.state.clock.elapse(dt);
        for _ in 0..secs {
            self.on_tick();
        }
        Ok(())
    }

    fn resolve_pending(&mut self) -> GameResult<()> {
        let phase = std::mem::replace(&mut self.state.phase, GamePhase::Playing);
        match phase {
            GamePhase::Correct(Pending {
                evaluation: Evaluation::Pair { first, second },
                ..
            }) => self.resolve_match(first, second),
            GamePhase::Incorrect(Pending {
                evaluation: Evaluation::Pair { first, second },
                ..
            }) => {
                let m = self.state.match_puzzle_mut()?;
                m.slots[first].revealed = false;
                m.slots[second].revealed = false;
                self.state.streak = 0;
                Ok(())
            }
            GamePhase::Peeking(_) => {
                let m = self.state.match_puzzle_mut()?;
                for slot in m.slots.iter_mut().filter(|s| !s.matched) {
                    slot.revealed = false;
                }
                Ok(())
            }
            GamePhase::Correct(Pending {
                evaluation: Evaluation::Word { .. },
                ..
            }) => {
                self.next_word();
                Ok(())
            }
            GamePhase::Incorrect(Pending {
                evaluation: Evaluation::Word { .. },
                ..
            }) => {
                let first = self.state.current_word().and_then(|s| s.first_editable());
                self.state.cursor = first;
                Ok(())
            }
            other => {
                self.state.phase = other;
                Err(GameError::InvalidAction("nothing to settle"))
            }
        }
    }

    fn resolve_match(&mut self, first: usize, second: usize) -> GameResult<()> {
        let m = self.state.match_puzzle_mut()?;
        m.slots[first].matched = true;
        m.slots[second].matched = true;
        let solved = m.is_solved();

        let time_remaining = self.scoring_time();
        let state = &mut self.state;
        state.streak += 1;
        state.combo += 1;
        state.matches += 1;
        let points = scoring::match_points(&MatchContext {
            level_index: state.level_index,
            streak: state.streak,
            combo: state.combo,
            time_remaining,
        });
        self.state.score += points;
        self.state.last_award = Some(points);
        debug!("pair matched for {} points", points);

        if solved {
            self.enter_level_complete();
        }
        Ok(())
    }

    fn next_word(&mut self) {
        let words = self.state.word_puzzle().map_or(0, |w| w.words.len());
        if self.state.word_index + 1 < words {
            self.state.word_index += 1;
            self.state.word_seconds = 0;
            self.state.cursor = self.state.current_word().and_then(|s| s.first_editable());
            self.state.phase = GamePhase::Playing;
        } else {
            self.enter_level_complete();
        }
    }

    /// Seconds that count towards time bonuses. Zen runs earn none.
    fn scoring_time(&self) -> u32 {
        if self.state.clock.is_untimed() {
            0
        } else {
            self.state.clock.remaining()
        }
    }

    /// Untimed play earns no speed bonus.
    fn word_scoring_secs(&self) -> u32 {
        if self.state.clock.is_untimed() {
            scoring::WORD_FAST_SECS
        } else {
            self.state.word_seconds
        }
    }

    fn enter_level_complete(&mut self) {
        self.state.clock.stop();
        let summary = LevelSummary {
            level_index: self.state.level_index,
            bonus: scoring::level_bonus(self.scoring_time()),
            is_last: self.catalog.is_last(self.state.level_index),
        };
        info!(
            "level {} cleared, bonus {}",
            summary.level_index + 1,
            summary.bonus
        );
        self.state.phase = GamePhase::LevelComplete(summary);
    }

    fn enter_timeout(&mut self) {
        self.state.clock.stop();
        let summary = self.state.run_summary(self.state.level_index);
        info!(
            "time ran out on level {} with {} points",
            summary.level_index + 1,
            summary.score
        );
        self.state.phase = GamePhase::Timeout(summary);
    }

    fn on_complete_level(&mut self) -> GameResult<()> {
        let GamePhase::LevelComplete(summary) = self.state.phase else {
            return Err(GameError::InvalidAction("level not complete"));
        };

        self.state.score += summary.bonus;
        self.state.streak = 0;
        let next = summary.level_index + 1;
        if next >= self.catalog.len() {
            let run = self.state.run_summary(next);
            info!("game complete with {} points", run.score);
            self.state.phase = GamePhase::GameComplete(run);
            return Ok(());
        }
        self.load_level(next)
    }

    fn on_pause(&mut self) -> GameResult<()> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::InvalidAction("can only pause while playing"));
        }
        self.state.clock.pause();
        self.state.phase = GamePhase::Paused;
        Ok(())
    }

    fn on_resume(&mut self) -> GameResult<()> {
        if self.state.phase != GamePhase::Paused {
            return Err(GameError::InvalidAction("not paused"));
        }
        self.state.clock.resume();
        self.state.phase = GamePhase::Playing;
        Ok(())
    }

    fn on_dispose(&mut self) {
        self.state.clock.stop();
        self.state.puzzle = None;
        self.state.phase = GamePhase::Idle;
    }
}
