use ratatui::Frame;

use crate::{
    ui::{render_results, scoreboard::render_scoreboard},
    App, AppState,
};

/// A UI Screen boundary: one per app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Board for the running game, overlays included
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_results(app, f);
    }
}

pub struct ScoreboardScreen;

impl Screen for ScoreboardScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_scoreboard(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(GameScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Scoreboard => Box::new(ScoreboardScreen),
    }
}
