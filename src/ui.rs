pub mod scoreboard;
pub mod screen;

use merrymind::{
    celebration::Celebration,
    config::Theme,
    level::GameMode,
    puzzle::{LetterState, MatchPuzzle, WordSlot},
    session::{Evaluation, GamePhase, Pending},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const CARD_WIDTH: u16 = 12;
const CARD_HEIGHT: u16 = 4;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color,
    pub good: Color,
    pub bad: Color,
    pub hint: Color,
    pub frame: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Festive => Self {
                accent: Color::Red,
                good: Color::Green,
                bad: Color::LightRed,
                hint: Color::Yellow,
                frame: Color::LightGreen,
            },
            Theme::Frost => Self {
                accent: Color::Cyan,
                good: Color::LightBlue,
                bad: Color::Magenta,
                hint: Color::White,
                frame: Color::Blue,
            },
            Theme::Mono => Self {
                accent: Color::Reset,
                good: Color::Reset,
                bad: Color::Reset,
                hint: Color::Reset,
                frame: Color::DarkGray,
            },
        }
    }
}

fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.config.theme);
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Length(1), // feedback
                Constraint::Min(3),    // board
                Constraint::Length(1), // keys
            ])
            .split(area);

        status_line(self, palette).render(chunks[0], buf);
        feedback_line(self, palette).render(chunks[1], buf);

        let state = self.session.state();
        if let Some(m) = state.match_puzzle() {
            render_cards(self, m, palette, chunks[2], buf);
        } else if let Some(slot) = state.current_word() {
            render_word(self, slot, palette, chunks[2], buf);
        }

        let keys = match self.session.mode() {
            GameMode::Memory => {
                "arrows move / enter flip / (h) peek / (x) +15s / (p)ause / (r)estart / (esc)ape"
            }
            GameMode::Words => {
                "type letters / enter check / ? or ^h hint / ^x +15s / ^p pause / ^r restart / (esc)ape"
            }
        };
        Paragraph::new(Span::styled(keys, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        match self.session.phase() {
            GamePhase::Paused => {
                overlay(
                    vec![
                        Line::styled("PAUSED", bold_style.fg(palette.accent)),
                        Line::from("enter to resume"),
                    ],
                    palette,
                    area,
                    buf,
                );
            }
            GamePhase::LevelComplete(summary) => {
                let next = if summary.is_last {
                    "enter to finish the run"
                } else {
                    "enter for the next level"
                };
                overlay(
                    vec![
                        Line::styled(
                            format!("Level {} cleared!", summary.level_index + 1),
                            bold_style.fg(palette.good),
                        ),
                        Line::from(format!("time bonus +{}", summary.bonus)),
                        Line::from(next),
                    ],
                    palette,
                    area,
                    buf,
                );
            }
            _ => {}
        }
    }
}

fn status_line(app: &App, palette: Palette) -> Paragraph<'static> {
    let session = &app.session;
    let state = session.state();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let label = session.level().map_or("", |l| l.difficulty_label);
    let mut spans = vec![
        Span::styled(
            format!(
                "Level {}/{} {}",
                state.level_index + 1,
                session.catalog().len(),
                label
            ),
            bold.fg(palette.accent),
        ),
        Span::styled("   Score ", dim),
        Span::styled(state.score.to_string(), bold),
        Span::styled("   Time ", dim),
    ];

    if state.clock.is_untimed() {
        spans.push(Span::styled("zen", bold));
    } else {
        let remaining = state.clock.remaining();
        let style = if remaining <= 10 {
            bold.fg(palette.bad)
        } else {
            bold
        };
        spans.push(Span::styled(format_clock(remaining), style));
    }

    match (session.mode(), state.moves_left) {
        (GameMode::Memory, Some(moves)) => {
            if let Some(m) = state.match_puzzle() {
                spans.push(Span::styled("   Pairs ", dim));
                spans.push(Span::styled(
                    format!("{}/{}", m.matched_pairs(), m.pair_count()),
                    bold,
                ));
            }
            spans.push(Span::styled("   Moves ", dim));
            spans.push(Span::styled(moves.to_string(), bold));
        }
        (GameMode::Words, _) => {
            let total = state.word_puzzle().map_or(0, |w| w.words.len());
            spans.push(Span::styled("   Word ", dim));
            spans.push(Span::styled(
                format!("{}/{}", (state.word_index + 1).min(total), total),
                bold,
            ));
        }
        _ => {}
    }

    spans.push(Span::styled("   Streak ", dim));
    spans.push(Span::styled(state.streak.to_string(), bold));
    if let Some(best) = app.best {
        spans.push(Span::styled("   Best ", dim));
        spans.push(Span::styled(best.to_string(), bold));
    }

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

fn feedback_line(app: &App, palette: Palette) -> Paragraph<'static> {
    let state = app.session.state();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let (text, style) = match app.session.phase() {
        GamePhase::Correct(Pending {
            evaluation: Evaluation::Word { points },
            ..
        }) => (format!("Correct! +{}", points), bold.fg(palette.good)),
        GamePhase::Correct(_) => ("A match!".to_string(), bold.fg(palette.good)),
        GamePhase::Incorrect(Pending {
            evaluation: Evaluation::Word { .. },
            ..
        }) => {
            let penalty = app
                .session
                .level()
                .map_or(0, |l| l.wrong_answer_penalty_secs);
            (
                format!("Not quite, -{}s", penalty),
                bold.fg(palette.bad),
            )
        }
        GamePhase::Incorrect(_) => ("No match".to_string(), bold.fg(palette.bad)),
        GamePhase::Peeking(_) => ("Take a good look...".to_string(), bold.fg(palette.hint)),
        _ => match state.last_award {
            Some(points) if state.streak > 1 => (
                format!("+{} (streak x{})", points, state.streak),
                Style::default().fg(palette.good),
            ),
            Some(points) => (format!("+{}", points), Style::default().fg(palette.good)),
            None => (String::new(), Style::default()),
        },
    };

    Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center)
}

/// Cards laid out row by row, centered in `area`.
fn render_cards(app: &App, puzzle: &MatchPuzzle, palette: Palette, area: Rect, buf: &mut Buffer) {
    let cols = app.grid_columns() as u16;
    let rows = (puzzle.slots.len() as u16).div_ceil(cols.max(1));
    let card_w = CARD_WIDTH.min(area.width / cols.max(1));
    let card_h = CARD_HEIGHT.min(area.height / rows.max(1)).max(3);

    let left = area.x + area.width.saturating_sub(card_w * cols) / 2;
    let top = area.y + area.height.saturating_sub(card_h * rows) / 2;

    let pending = match app.session.phase() {
        GamePhase::Correct(Pending {
            evaluation: Evaluation::Pair { first, second },
            ..
        }) => Some((*first, *second, palette.good)),
        GamePhase::Incorrect(Pending {
            evaluation: Evaluation::Pair { first, second },
            ..
        }) => Some((*first, *second, palette.bad)),
        _ => None,
    };

    for (i, slot) in puzzle.slots.iter().enumerate() {
        let (row, col) = (i as u16 / cols, i as u16 % cols);
        let rect = Rect::new(left + col * card_w, top + row * card_h, card_w, card_h).intersection(area);
        if rect.is_empty() {
            continue;
        }

        let mut border = Style::default().fg(palette.frame);
        let mut face = Style::default().add_modifier(Modifier::BOLD);
        if slot.matched {
            face = face.fg(palette.good).add_modifier(Modifier::DIM);
            border = border.add_modifier(Modifier::DIM);
        }
        if let Some((a, b, color)) = pending {
            if i == a || i == b {
                border = border.fg(color);
            }
        }

        let selected = i == app.selected;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(if selected {
                border.fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                border
            });

        let inner_width = rect.width.saturating_sub(2) as usize;
        let lines = if slot.revealed || slot.matched {
            let mut lines = vec![Line::styled(slot.symbol.glyph.clone(), face)];
            if slot.symbol.name.width() <= inner_width && rect.height > 3 {
                lines.push(Line::styled(
                    slot.symbol.name.clone(),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            lines
        } else {
            vec![Line::styled("?", Style::default().fg(palette.accent))]
        };

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .render(rect, buf);
    }
}

fn letter_span(slot: &WordSlot, pos: usize, cursor: Option<usize>, palette: Palette) -> Span<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let (ch, style) = match slot.states[pos] {
        LetterState::Fixed => (slot.letters[pos], bold),
        LetterState::Hidden => (
            slot.user_letters.get(&pos).copied().unwrap_or('_'),
            bold.fg(palette.accent),
        ),
        LetterState::Correct => (slot.letters[pos], bold.fg(palette.good)),
        LetterState::Incorrect => (
            slot.user_letters.get(&pos).copied().unwrap_or('_'),
            bold.fg(palette.bad).add_modifier(Modifier::CROSSED_OUT),
        ),
        LetterState::Hinted => (
            slot.letters[pos],
            bold.fg(palette.hint).add_modifier(Modifier::ITALIC),
        ),
    };
    let style = if cursor == Some(pos) {
        style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED)
    } else {
        style
    };
    Span::styled(ch.to_string(), style)
}

fn render_word(app: &App, slot: &WordSlot, palette: Palette, area: Rect, buf: &mut Buffer) {
    let state = app.session.state();
    let cursor = match app.session.phase() {
        GamePhase::Playing => state.cursor,
        _ => None,
    };

    let mut letters = Vec::with_capacity(slot.letters.len() * 2);
    for pos in 0..slot.letters.len() {
        if pos > 0 {
            letters.push(Span::raw(" "));
        }
        letters.push(letter_span(slot, pos, cursor, palette));
    }

    let solved: Vec<Span> = state
        .word_puzzle()
        .map(|w| {
            w.words
                .iter()
                .take(state.word_index)
                .map(|s| Span::styled(format!("{} ", s.source.text), Style::default().fg(palette.good)))
                .collect()
        })
        .unwrap_or_default();

    let hint_style = Style::default()
        .fg(palette.hint)
        .add_modifier(Modifier::ITALIC);
    let lines = vec![
        Line::styled(
            slot.source.category.to_uppercase(),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Line::styled(slot.source.hint.clone(), hint_style),
        Line::from(""),
        Line::from(letters),
        Line::from(""),
        Line::from(solved),
    ];

    let height = (lines.len() as u16).min(area.height);
    let rect = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height) / 2,
        area.width,
        height,
    );
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rect, buf);
}

/// Small boxed message over the middle of `area`.
fn overlay(lines: Vec<Line<'static>>, palette: Palette, area: Rect, buf: &mut Buffer) {
    let width = lines
        .iter()
        .map(|l| l.width() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(6)
        .min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    Clear.render(rect, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(palette.frame)),
        )
        .alignment(Alignment::Center)
        .render(rect, buf);
}

/// Final score after a run, with confetti when every level was cleared.
pub fn render_results(app: &App, f: &mut Frame) {
    let palette = Palette::for_theme(app.config.theme);
    let area = f.area();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let (title, summary) = match app.session.phase() {
        GamePhase::GameComplete(s) => ("Every level cleared!", *s),
        GamePhase::Timeout(s) => ("Time's up!", *s),
        _ => return,
    };
    let is_best = app.best.is_some_and(|best| best <= summary.score);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines = vec![
        Line::styled(title, bold_style.fg(palette.accent)),
        Line::from(""),
        Line::styled(format!("{} points", summary.score), bold_style),
        Line::from(format!(
            "{} game, reached level {} of {}, {} cleared",
            app.session.mode(),
            summary.level_index + 1,
            app.session.catalog().len(),
            summary.levels_cleared
        )),
    ];
    if is_best && summary.score > 0 {
        lines.push(Line::styled("New best score!", bold_style.fg(palette.good)));
    }
    if let Some(seed) = app.seed {
        lines.push(Line::styled(
            format!("seed {}", seed),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[1]);

    f.render_widget(
        Paragraph::new(Span::styled(
            "(r)etry / (s)coreboard / (esc)ape",
            italic_style,
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );

    if app.celebration.is_active {
        render_celebration(&app.celebration, area, f.buffer_mut());
    }
}

fn render_celebration(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::White,
        Color::LightRed,
        Color::LightGreen,
        Color::Cyan,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let fading = particle.age / particle.max_age > 0.7;
        let style = if particle.is_text {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if fading {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(color)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
