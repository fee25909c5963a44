// SQLite run history: one dated snapshot of the output document per day.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Summary row for one stored run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub run_date: NaiveDate,
    /// RFC 3339 timestamp of the last write for this date.
    pub generated_at: String,
    pub player_count: usize,
    pub gameweeks: usize,
}

/// SQLite-backed store of past output documents.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the history database at `path`. Pass `":memory:"` for
    /// an ephemeral store.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open history database at {path}"))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS runs (
                run_date     TEXT PRIMARY KEY,
                generated_at TEXT NOT NULL,
                player_count INTEGER NOT NULL,
                gameweeks    INTEGER NOT NULL,
                document     TEXT NOT NULL
            );
            ",
        )
        .context("failed to create history schema")?;

        Ok(Self { conn })
    }

    /// Store today's (UTC) document, replacing any earlier run from today.
    pub fn record_run(&self, player_count: usize, gameweeks: usize, document: &str) -> Result<RunEntry> {
        let now = Utc::now();
        self.record_run_on(now.date_naive(), &now.to_rfc3339(), player_count, gameweeks, document)
    }

    /// Store a document under an explicit date.
    pub fn record_run_on(
        &self,
        run_date: NaiveDate,
        generated_at: &str,
        player_count: usize,
        gameweeks: usize,
        document: &str,
    ) -> Result<RunEntry> {
        self.conn
            .execute(
                "INSERT INTO runs (run_date, generated_at, player_count, gameweeks, document)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(run_date) DO UPDATE SET
                     generated_at = excluded.generated_at,
                     player_count = excluded.player_count,
                     gameweeks    = excluded.gameweeks,
                     document     = excluded.document",
                params![
                    run_date.to_string(),
                    generated_at,
                    player_count as i64,
                    gameweeks as i64,
                    document
                ],
            )
            .context("failed to record run")?;

        Ok(RunEntry {
            run_date,
            generated_at: generated_at.to_string(),
            player_count,
            gameweeks,
        })
    }

    /// All stored runs, newest first.
    pub fn list_runs(&self) -> Result<Vec<RunEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT run_date, generated_at, player_count, gameweeks
                 FROM runs ORDER BY run_date DESC",
            )
            .context("failed to prepare list_runs query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .context("failed to query runs")?;

        let mut entries = Vec::new();
        for row in rows {
            let (date, generated_at, player_count, gameweeks) =
                row.context("failed to read run row")?;
            let run_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid run_date '{date}' in history"))?;
            entries.push(RunEntry {
                run_date,
                generated_at,
                player_count: player_count.max(0) as usize,
                gameweeks: gameweeks.max(0) as usize,
            });
        }
        Ok(entries)
    }

    /// The stored document for `run_date`, if any.
    pub fn document(&self, run_date: NaiveDate) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT document FROM runs WHERE run_date = ?1",
                params![run_date.to_string()],
                |row| row.get(0),
            )
            .optional()
            .context("failed to load run document")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
