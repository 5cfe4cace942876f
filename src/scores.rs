use chrono::{DateTime, Local};
use clap::ValueEnum;
use log::debug;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{
    app_dirs::AppDirs,
    level::GameMode,
    scoring::Difficulty,
    session::{RunSummary, SessionConfig},
};

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score database: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("score directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScoreResult<T> = Result<T, ScoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Timeout,
}

impl RunOutcome {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(RunOutcome::Completed),
            "timeout" => Some(RunOutcome::Timeout),
            _ => None,
        }
    }
}

/// A finished run as kept on the scoreboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub zen: bool,
    pub score: u32,
    /// 1-based level the run ended on.
    pub level_reached: usize,
    pub outcome: RunOutcome,
    pub finished_at: DateTime<Local>,
}

impl RunRecord {
    pub fn new(config: &SessionConfig, summary: &RunSummary, outcome: RunOutcome) -> Self {
        Self {
            mode: config.mode,
            difficulty: config.difficulty,
            zen: config.untimed,
            score: summary.score,
            level_reached: summary.level_index + 1,
            outcome,
            finished_at: Local::now(),
        }
    }
}

/// Local high-score table
#[derive(Debug)]
pub struct ScoresDb {
    conn: Connection,
}

impl ScoresDb {
    /// Open the scoreboard in the state directory.
    pub fn new() -> ScoreResult<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("merrymind_scores.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> ScoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("opening scores at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> ScoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> ScoreResult<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mode TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                zen BOOLEAN NOT NULL,
                score INTEGER NOT NULL,
                level_reached INTEGER NOT NULL,
                outcome TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_runs_mode_score ON runs(mode, score)",
            [],
        )?;

        Ok(ScoresDb { conn })
    }

    pub fn record_run(&self, run: &RunRecord) -> ScoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO runs
            (mode, difficulty, zen, score, level_reached, outcome, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                run.mode.to_string(),
                run.difficulty.to_string(),
                run.zen,
                run.score,
                run.level_reached as i64,
                run.outcome.to_string(),
                run.finished_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn best_score(&self, mode: GameMode) -> ScoreResult<Option<u32>> {
        let best: Option<u32> = self.conn.query_row(
            "SELECT MAX(score) FROM runs WHERE mode = ?1",
            [mode.to_string()],
            |row| row.get(0),
        )?;
        Ok(best)
    }

    /// Highest scores first, newest first among ties.
    pub fn top_runs(&self, mode: GameMode, limit: usize) -> ScoreResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT mode, difficulty, zen, score, level_reached, outcome, finished_at
            FROM runs
            WHERE mode = ?1
            ORDER BY score DESC, finished_at DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![mode.to_string(), limit as i64], |row| {
            let text_column = |idx: usize, name: &str| {
                rusqlite::Error::InvalidColumnType(
                    idx,
                    name.to_string(),
                    rusqlite::types::Type::Text,
                )
            };

            let mode: String = row.get(0)?;
            let difficulty: String = row.get(1)?;
            let outcome: String = row.get(5)?;
            let finished_at: String = row.get(6)?;
            let level_reached: i64 = row.get(4)?;

            Ok(RunRecord {
                mode: GameMode::from_str(&mode, true).map_err(|_| text_column(0, "mode"))?,
                difficulty: Difficulty::from_str(&difficulty, true)
                    .map_err(|_| text_column(1, "difficulty"))?,
                zen: row.get(2)?,
                score: row.get(3)?,
                level_reached: level_reached.max(0) as usize,
                outcome: RunOutcome::parse(&outcome).ok_or_else(|| text_column(5, "outcome"))?,
                finished_at: DateTime::parse_from_rfc3339(&finished_at)
                    .map_err(|_| text_column(6, "finished_at"))?
                    .with_timezone(&Local),
            })
        })?;

        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }
}
