use merrymind::scores::{RunOutcome, RunRecord};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{ui::Palette, App};

/// One scoreboard line
pub fn present_row(rank: usize, run: &RunRecord, palette: Palette) -> Row<'static> {
    let outcome_style = match run.outcome {
        RunOutcome::Completed => Style::default().fg(palette.good),
        RunOutcome::Timeout => Style::default().add_modifier(Modifier::DIM),
    };
    let difficulty = if run.zen {
        format!("{} zen", run.difficulty)
    } else {
        run.difficulty.to_string()
    };

    Row::new(vec![
        Cell::from(format!("{}.", rank)),
        Cell::from(run.score.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(run.level_reached.to_string()),
        Cell::from(difficulty),
        Cell::from(run.outcome.to_string()).style(outcome_style),
        Cell::from(run.finished_at.format("%Y-%m-%d %H:%M").to_string()),
    ])
}

pub fn render_scoreboard(app: &App, f: &mut Frame) {
    let palette = Palette::for_theme(app.config.theme);
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // table
            Constraint::Length(1), // keys
        ])
        .split(area);

    let title = Paragraph::new(format!("Scoreboard ({})", app.session.mode()))
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if app.top_runs.is_empty() {
        let empty = Paragraph::new("No finished runs yet. Go play!")
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let header = Row::new(vec!["#", "Score", "Level", "Difficulty", "Outcome", "Finished"]).style(
            Style::default()
                .fg(palette.hint)
                .add_modifier(Modifier::BOLD),
        );
        let rows: Vec<Row> = app
            .top_runs
            .iter()
            .enumerate()
            .map(|(i, run)| present_row(i + 1, run, palette))
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(16),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.frame)),
        );
        f.render_widget(table, chunks[1]);
    }

    let keys = Paragraph::new("(b)ack / (r)etry / (esc)ape")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(keys, chunks[2]);
}
