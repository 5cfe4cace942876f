mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, info, warn};
use merrymind::{
    app_dirs::AppDirs,
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore, Theme},
    error::GameResult,
    level::GameMode,
    pool::ContentPool,
    runtime::{CrosstermEventSource, FrameClock, GameEvent, GameEventSource, Runner, WallClock},
    scores::{RunOutcome, RunRecord, ScoresDb},
    scoring::Difficulty,
    session::{Action, CursorMove, GamePhase, PowerUp, Session, SessionConfig},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    env,
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
};

const SCOREBOARD_SIZE: usize = 10;

/// festive memory and word puzzles in the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Holiday mini-games for the terminal: flip cards to find matching pairs, or fill in the missing letters of festive words before the clock runs out."
)]
pub struct Cli {
    /// game to play, defaults to the last one played
    #[clap(value_enum)]
    mode: Option<GameMode>,

    /// scales word points; hard also hides consonants first
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// play without a clock (no time bonuses)
    #[clap(long)]
    zen: bool,

    /// seed for reproducible boards
    #[clap(long)]
    seed: Option<u64>,

    /// only draw words from the level's own tiers
    #[clap(long)]
    no_blend: bool,

    /// color theme
    #[clap(short = 't', long, value_enum)]
    theme: Option<Theme>,

    /// write debug logs to the state directory
    #[clap(long)]
    debug: bool,
}

impl Cli {
    /// Stored preferences with this invocation's flags on top.
    fn apply(&self, stored: &Config) -> Config {
        Config {
            mode: self.mode.unwrap_or(stored.mode),
            difficulty: self.difficulty.unwrap_or(stored.difficulty),
            zen: self.zen || stored.zen,
            blend_next_tier: stored.blend_next_tier && !self.no_blend,
            theme: self.theme.unwrap_or(stored.theme),
        }
    }

    /// What to remember for next time. One-off flags are not persisted.
    fn remember(&self, stored: &Config) -> Config {
        Config {
            mode: self.mode.unwrap_or(stored.mode),
            difficulty: self.difficulty.unwrap_or(stored.difficulty),
            theme: self.theme.unwrap_or(stored.theme),
            ..stored.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
    Scoreboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitType {
    Restart,
    Quit,
}

pub struct App {
    pub config: Config,
    pub seed: Option<u64>,
    pub session: Session,
    pub state: AppState,
    /// Selected card in the memory grid.
    pub selected: usize,
    pub best: Option<u32>,
    pub top_runs: Vec<RunRecord>,
    pub celebration: Celebration,
    /// Last drawn terminal size.
    pub viewport: (u16, u16),
    scores: Option<ScoresDb>,
    recorded: bool,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>, scores: Option<ScoresDb>) -> GameResult<Self> {
        let session = Self::build_session(&config, seed)?;
        let mut app = Self {
            config,
            seed,
            session,
            state: AppState::Playing,
            selected: 0,
            best: None,
            top_runs: Vec::new(),
            celebration: Celebration::new(),
            viewport: (80, 24),
            scores,
            recorded: false,
        };
        app.refresh_scores();
        app.session.start()?;
        Ok(app)
    }

    fn build_session(config: &Config, seed: Option<u64>) -> GameResult<Session> {
        let pool = ContentPool::embedded()?;
        let session_config = SessionConfig::from(config);
        Ok(match seed {
            Some(seed) => Session::seeded(session_config, pool, seed),
            None => Session::new(session_config, pool),
        })
    }

    /// Throw the current run away and deal a fresh one.
    pub fn reset(&mut self) -> GameResult<()> {
        self.session.dispose()?;
        self.session.start()?;
        self.state = AppState::Playing;
        self.selected = 0;
        self.recorded = false;
        self.celebration.stop();
        Ok(())
    }

    pub fn grid_columns(&self) -> usize {
        let cards = self
            .session
            .state()
            .match_puzzle()
            .map_or(0, |m| m.slots.len());
        grid_columns(cards)
    }

    fn refresh_scores(&mut self) {
        let Some(db) = &self.scores else {
            return;
        };
        let mode = self.session.mode();
        match (db.best_score(mode), db.top_runs(mode, SCOREBOARD_SIZE)) {
            (Ok(best), Ok(top)) => {
                self.best = best;
                self.top_runs = top;
            }
            (Err(e), _) | (_, Err(e)) => warn!("could not read scoreboard: {}", e),
        }
    }

    /// Best-effort write of a finished run.
    fn record(&mut self, outcome: RunOutcome) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let summary = match self.session.phase() {
            GamePhase::GameComplete(s) | GamePhase::Timeout(s) => *s,
            _ => return,
        };
        let run = RunRecord::new(self.session.config(), &summary, outcome);
        if let Some(db) = &self.scores {
            if let Err(e) = db.record_run(&run) {
                warn!("could not save run: {}", e);
            }
        }
        info!("run over: {} points ({})", run.score, outcome);
        self.refresh_scores();
    }

    /// Move to the results screen once the run is over.
    fn sync(&mut self) {
        if self.state != AppState::Playing {
            return;
        }
        let outcome = match self.session.phase() {
            GamePhase::GameComplete(_) => RunOutcome::Completed,
            GamePhase::Timeout(_) => RunOutcome::Timeout,
            _ => return,
        };
        self.record(outcome);
        if outcome == RunOutcome::Completed {
            let (width, height) = self.viewport;
            self.celebration.start(width, height, &mut rand::thread_rng());
        }
        self.state = AppState::Results;
    }

    fn submit(&mut self, action: Action) {
        if let Err(e) = self.session.submit(action) {
            debug!("ignored {:?}: {}", action, e);
        }
    }

    /// Stop the clock while the player is in another window.
    fn on_focus_lost(&mut self) {
        if self.state == AppState::Playing && self.session.phase() == &GamePhase::Playing {
            debug!("focus lost, pausing");
            let _ = self.session.pause();
        }
    }

    pub fn on_tick(&mut self, dt: std::time::Duration) {
        if let Err(e) = self.session.advance(dt) {
            debug!("advance: {}", e);
        }
        self.celebration.update(dt);
        self.sync();
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<ExitType> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Some(ExitType::Quit);
        }

        let exit = match self.state {
            AppState::Playing => self.on_game_key(key, ctrl),
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Char('n') | KeyCode::Enter => Some(ExitType::Restart),
                KeyCode::Char('s') => {
                    self.state = AppState::Scoreboard;
                    None
                }
                _ => None,
            },
            AppState::Scoreboard => match key.code {
                KeyCode::Char('r') | KeyCode::Char('n') => Some(ExitType::Restart),
                KeyCode::Char('b') | KeyCode::Char('s') | KeyCode::Backspace => {
                    self.state = AppState::Results;
                    None
                }
                _ => None,
            },
        };
        self.sync();
        exit
    }

    fn on_game_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<ExitType> {
        let mode = self.session.mode();
        // Word games need plain letters for typing, so commands take ctrl there.
        let command = match key.code {
            KeyCode::Char('?') => Some('h'),
            KeyCode::Char(c) if mode == GameMode::Memory || ctrl => Some(c.to_ascii_lowercase()),
            _ => None,
        };

        match self.session.phase() {
            GamePhase::Paused => {
                if matches!(command, Some('p')) || key.code == KeyCode::Enter {
                    let _ = self.session.resume();
                }
                return match command {
                    Some('r') => Some(ExitType::Restart),
                    _ => None,
                };
            }
            GamePhase::LevelComplete(_) => {
                if matches!(command, Some('n')) || key.code == KeyCode::Enter {
                    if let Err(e) = self.session.complete_level() {
                        warn!("could not load next level: {}", e);
                    }
                    self.selected = 0;
                }
                return match command {
                    Some('r') => Some(ExitType::Restart),
                    _ => None,
                };
            }
            GamePhase::Correct(_) | GamePhase::Incorrect(_) | GamePhase::Peeking(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    let _ = self.session.settle();
                }
                return match command {
                    Some('r') => Some(ExitType::Restart),
                    _ => None,
                };
            }
            _ => {}
        }

        match command {
            Some('h') => self.submit(Action::RequestHint),
            Some('x') => self.submit(Action::UsePowerUp(PowerUp::ExtraTime)),
            Some('p') => {
                let _ = self.session.pause();
            }
            Some('r') => return Some(ExitType::Restart),
            _ => match mode {
                GameMode::Memory => self.on_memory_key(key),
                GameMode::Words => self.on_word_key(key),
            },
        }
        None
    }

    fn on_memory_key(&mut self, key: KeyEvent) {
        let cards = self
            .session
            .state()
            .match_puzzle()
            .map_or(0, |m| m.slots.len());
        if cards == 0 {
            return;
        }
        let cols = grid_columns(cards);
        let sel = self.selected.min(cards - 1);

        self.selected = match key.code {
            KeyCode::Left => sel.saturating_sub(1),
            KeyCode::Right => (sel + 1).min(cards - 1),
            KeyCode::Up => sel.checked_sub(cols).unwrap_or(sel),
            KeyCode::Down if sel + cols < cards => sel + cols,
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.submit(Action::FlipCard(sel));
                sel
            }
            _ => sel,
        };
    }

    fn on_word_key(&mut self, key: KeyEvent) {
        let word = self.session.state().word_index;
        let cursor = self.session.state().cursor;

        match key.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                if let Some(pos) = cursor {
                    self.submit(Action::EnterLetter {
                        word,
                        pos,
                        letter: c,
                    });
                }
            }
            KeyCode::Backspace => {
                let Some(pos) = cursor else { return };
                let filled = self
                    .session
                    .state()
                    .current_word()
                    .is_some_and(|w| w.user_letters.contains_key(&pos));
                if !filled {
                    self.submit(Action::MoveCursor(CursorMove::Left));
                }
                if let Some(pos) = self.session.state().cursor {
                    self.submit(Action::ClearLetter { word, pos });
                }
            }
            KeyCode::Left => self.submit(Action::MoveCursor(CursorMove::Left)),
            KeyCode::Right => self.submit(Action::MoveCursor(CursorMove::Right)),
            KeyCode::Enter => self.submit(Action::RequestCheck),
            _ => {}
        }
    }
}

fn grid_columns(cards: usize) -> usize {
    match cards {
        0..=4 => cards.max(1),
        5..=16 => 4,
        _ => 5,
    }
}

fn init_logging(debug: bool) {
    if debug {
        env::set_var("RUST_LOG", "debug");
    }
    let mut builder = env_logger::Builder::from_default_env();

    // stderr belongs to the TUI, so logs go to a file or nowhere
    let file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    match file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let stored = store.load();
    let config = cli.apply(&stored);
    if let Err(e) = store.save(&cli.remember(&stored)) {
        warn!("could not save preferences to {}: {}", store.path().display(), e);
    }

    let scores = match ScoresDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("scoreboard disabled: {}", e);
            None
        }
    };
    let mut app = App::new(config, cli.seed, scores)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::spawn(), WallClock::default());
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: GameEventSource, C: FrameClock>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, C>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        let exit = match runner.step() {
            GameEvent::Tick(dt) => {
                app.on_tick(dt);
                None
            }
            GameEvent::FocusLost => {
                app.on_focus_lost();
                None
            }
            GameEvent::Resize => None,
            GameEvent::Key(key) => app.on_key(key),
        };

        match exit {
            Some(ExitType::Restart) => app.reset()?,
            Some(ExitType::Quit) => {
                app.session.dispose()?;
                break;
            }
            None => {}
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let area = f.area();
    app.viewport = (area.width, area.height);
    let screen = ui::screen::current_screen(&app.state);
    screen.render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use merrymind::session::PhaseKind;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app(mode: GameMode) -> App {
        let config = Config {
            mode,
            ..Config::default()
        };
        App::new(config, Some(42), Some(ScoresDb::in_memory().unwrap())).unwrap()
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn cli_flags_override_stored_config() {
        let stored = Config {
            mode: GameMode::Words,
            theme: Theme::Frost,
            ..Config::default()
        };
        let cli = Cli {
            mode: Some(GameMode::Memory),
            difficulty: Some(Difficulty::Hard),
            zen: true,
            no_blend: true,
            ..Cli::default()
        };

        let cfg = cli.apply(&stored);
        assert_eq!(cfg.mode, GameMode::Memory);
        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert_eq!(cfg.theme, Theme::Frost);
        assert!(cfg.zen);
        assert!(!cfg.blend_next_tier);

        let remembered = cli.remember(&stored);
        assert_eq!(remembered.mode, GameMode::Memory);
        assert!(!remembered.zen);
        assert!(remembered.blend_next_tier);
    }

    #[test]
    fn cli_parses_mode_and_flags() {
        let cli = Cli::try_parse_from(["merrymind", "words", "--difficulty", "medium", "--zen"])
            .unwrap();
        assert_eq!(cli.mode, Some(GameMode::Words));
        assert_eq!(cli.difficulty, Some(Difficulty::Medium));
        assert!(cli.zen);
        assert!(Cli::try_parse_from(["merrymind", "chess"]).is_err());
    }

    #[test]
    fn grid_columns_by_board_size() {
        assert_eq!(grid_columns(4), 4);
        assert_eq!(grid_columns(6), 4);
        assert_eq!(grid_columns(16), 4);
        assert_eq!(grid_columns(20), 5);
    }

    #[test]
    fn app_starts_playing() {
        let app = app(GameMode::Memory);
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.session.phase().kind(), PhaseKind::Playing);
        assert_eq!(app.best, None);
    }

    #[test]
    fn arrows_move_selection_and_enter_flips() {
        let mut app = app(GameMode::Memory);

        app.on_key(key(KeyCode::Right));
        assert_eq!(app.selected, 1);
        app.on_key(key(KeyCode::Enter));
        assert!(app.session.state().match_puzzle().unwrap().slots[1].revealed);
        app.on_key(key(KeyCode::Left));
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn pause_key_toggles() {
        let mut app = app(GameMode::Memory);
        app.on_key(key(KeyCode::Char('p')));
        assert_eq!(app.session.phase(), &GamePhase::Paused);
        app.on_key(key(KeyCode::Char('p')));
        assert_eq!(app.session.phase(), &GamePhase::Playing);
    }

    #[test]
    fn losing_focus_pauses_only_live_play() {
        let mut app = app(GameMode::Memory);
        app.on_focus_lost();
        assert_eq!(app.session.phase(), &GamePhase::Paused);

        // already paused stays paused, and resume works as usual
        app.on_focus_lost();
        assert_eq!(app.session.phase(), &GamePhase::Paused);
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.session.phase(), &GamePhase::Playing);

        for _ in 0..60 {
            app.on_tick(Duration::from_secs(1));
        }
        app.on_focus_lost();
        assert_eq!(app.session.phase().kind(), PhaseKind::Timeout);
    }

    #[test]
    fn word_mode_types_letters_and_uses_ctrl_for_commands() {
        let mut app = app(GameMode::Words);
        let pos = app.session.state().cursor.unwrap();
        let letter = app.session.state().current_word().unwrap().letters[pos];
        let wrong = if letter == 'P' { 'q' } else { 'p' };

        app.on_key(ctrl('p'));
        assert_eq!(app.session.phase(), &GamePhase::Paused);
        app.on_key(ctrl('p'));

        app.on_key(key(KeyCode::Char(wrong)));
        assert_ne!(app.session.phase(), &GamePhase::Paused);
        assert_eq!(app.session.phase().kind(), PhaseKind::Incorrect);
    }

    #[test]
    fn timeout_records_run_and_shows_results() {
        let mut app = app(GameMode::Memory);
        for _ in 0..60 {
            app.on_tick(Duration::from_secs(1));
        }

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.best, Some(0));
        assert_eq!(app.top_runs.len(), 1);
        assert_eq!(app.top_runs[0].outcome, RunOutcome::Timeout);

        app.on_key(key(KeyCode::Char('s')));
        assert_eq!(app.state, AppState::Scoreboard);
        assert!(render(&mut app).contains("Scoreboard"));

        assert_eq!(app.on_key(key(KeyCode::Char('r'))), Some(ExitType::Restart));
        app.reset().unwrap();
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.session.score(), 0);
    }

    #[test]
    fn escape_quits() {
        let mut app = app(GameMode::Words);
        assert_eq!(app.on_key(key(KeyCode::Esc)), Some(ExitType::Quit));
        assert_eq!(app.on_key(ctrl('c')), Some(ExitType::Quit));
    }

    #[test]
    fn renders_each_game() {
        let mut memory = app(GameMode::Memory);
        let screen = render(&mut memory);
        assert!(screen.contains("Level 1"));
        assert!(screen.contains("Moves"));
        assert!(screen.contains("Pairs 0/2"));

        let mut words = app(GameMode::Words);
        let screen = render(&mut words);
        assert!(screen.contains("Level 1"));
        assert!(screen.contains('_'));
    }

    #[test]
    fn renders_paused_overlay() {
        let mut app = app(GameMode::Memory);
        app.on_key(key(KeyCode::Char('p')));
        assert!(render(&mut app).contains("PAUSED"));
    }
}
