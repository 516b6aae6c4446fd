use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::audit::{FinalScore, GradedRow, LeagueSummary, grade_prediction, matchup_key, summarize};
use crate::league_config::League;
use crate::orchestrator::LeagueReport;

const STORE_DIR: &str = "hoops_engine";
const STORE_FILE: &str = "predictions.sqlite";

#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrediction {
    pub id: i64,
    pub league: String,
    pub game_date: String,
    pub matchup: String,
    pub model_total: f64,
    pub market_total: f64,
}

/// Latest report per league plus the per-game prediction history.
pub struct PredictionStore {
    conn: Connection,
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".cache").join(STORE_DIR).join(STORE_FILE))
}

impl PredictionStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Upserts the report and one pending row per game. Graded rows are left alone.
    pub fn save_report(&mut self, report: &LeagueReport) -> Result<usize> {
        let league = report.league.key();
        let game_date = report.date.to_string();
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(report).context("serialize league report")?;

        let tx = self.conn.transaction().context("begin save transaction")?;
        tx.execute(
            r#"
            INSERT INTO reports (league, game_date, mode, data, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(league) DO UPDATE SET
                game_date = excluded.game_date,
                mode = excluded.mode,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            params![league, game_date, report.mode.as_str(), data, now],
        )
        .context("upsert report")?;

        let mut saved = 0usize;
        for game in &report.games {
            let p = &game.prediction;
            saved += tx
                .execute(
                    r#"
                    INSERT INTO predictions (
                        league, game_date, matchup, model_total, safe_total, market_total,
                        edge, tier, decision, mode, status, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'pending', ?11)
                    ON CONFLICT(league, game_date, matchup) DO UPDATE SET
                        model_total = excluded.model_total,
                        safe_total = excluded.safe_total,
                        market_total = excluded.market_total,
                        edge = excluded.edge,
                        tier = excluded.tier,
                        decision = excluded.decision,
                        mode = excluded.mode,
                        updated_at = excluded.updated_at
                    WHERE predictions.status = 'pending'
                    "#,
                    params![
                        league,
                        game_date,
                        game.matchup,
                        p.final_model_total,
                        p.safe_total,
                        p.market_total,
                        p.edge,
                        p.mode.as_str(),
                        p.decision.as_str(),
                        report.mode.as_str(),
                        now,
                    ],
                )
                .context("upsert prediction")?;
        }
        tx.commit().context("commit save transaction")?;
        info!(league, date = %game_date, saved, "report saved");
        Ok(saved)
    }

    pub fn latest_report(&self, league: League) -> Result<Option<LeagueReport>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM reports WHERE league = ?1",
                params![league.key()],
                |row| row.get(0),
            )
            .optional()
            .context("query latest report")?;
        data.map(|raw| serde_json::from_str(&raw).context("decode stored report"))
            .transpose()
    }

    pub fn pending(&self, league: League, date: NaiveDate) -> Result<Vec<PendingPrediction>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT id, league, game_date, matchup, model_total, market_total
                FROM predictions
                WHERE league = ?1 AND game_date = ?2 AND status = 'pending'
                ORDER BY id ASC
                "#,
            )
            .context("prepare pending query")?;
        let rows = stmt
            .query_map(params![league.key(), date.to_string()], |row| {
                Ok(PendingPrediction {
                    id: row.get(0)?,
                    league: row.get(1)?,
                    game_date: row.get(2)?,
                    matchup: row.get(3)?,
                    model_total: row.get(4)?,
                    market_total: row.get(5)?,
                })
            })
            .context("query pending predictions")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode pending row")?);
        }
        Ok(out)
    }

    /// Grades pending rows whose matchup matches a final score. Returns rows graded.
    pub fn apply_results(
        &mut self,
        league: League,
        date: NaiveDate,
        scores: &[FinalScore],
    ) -> Result<usize> {
        let by_key: HashMap<String, &FinalScore> = scores.iter().map(|s| (s.key(), s)).collect();
        let pending = self.pending(league, date)?;
        if pending.is_empty() {
            info!(league = %league, %date, "no pending predictions");
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("begin grading transaction")?;
        let mut graded = 0usize;
        for row in &pending {
            let Some(score) = matchup_key(&row.matchup).and_then(|k| by_key.get(&k).copied()) else {
                debug!(matchup = %row.matchup, "no final score");
                continue;
            };
            let pick = grade_prediction(row.model_total, row.market_total, score);
            tx.execute(
                r#"
                UPDATE predictions
                SET actual_away = ?1, actual_home = ?2, actual_total = ?3,
                    is_win = ?4, profit = ?5, status = 'graded', updated_at = ?6
                WHERE id = ?7
                "#,
                params![
                    score.away_score,
                    score.home_score,
                    score.total(),
                    pick.is_win,
                    pick.profit,
                    now,
                    row.id
                ],
            )
            .context("update graded prediction")?;
            graded += 1;
        }
        tx.commit().context("commit grading transaction")?;
        info!(league = %league, %date, graded, pending = pending.len(), "results applied");
        Ok(graded)
    }

    pub fn graded_rows(&self) -> Result<Vec<GradedRow>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT league, game_date, matchup, model_total, market_total,
                       actual_total, is_win, profit
                FROM predictions
                WHERE status = 'graded'
                ORDER BY game_date ASC, id ASC
                "#,
            )
            .context("prepare graded query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GradedRow {
                    league: row.get(0)?,
                    game_date: row.get(1)?,
                    matchup: row.get(2)?,
                    model_total: row.get(3)?,
                    market_total: row.get(4)?,
                    actual_total: row.get(5)?,
                    is_win: row.get(6)?,
                    profit: row.get(7)?,
                })
            })
            .context("query graded predictions")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode graded row")?);
        }
        Ok(out)
    }

    pub fn summary(&self) -> Result<Vec<LeagueSummary>> {
        Ok(summarize(&self.graded_rows()?))
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS reports (
            league TEXT PRIMARY KEY,
            game_date TEXT NOT NULL,
            mode TEXT NOT NULL,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league TEXT NOT NULL,
            game_date TEXT NOT NULL,
            matchup TEXT NOT NULL,
            model_total REAL NOT NULL,
            safe_total REAL NOT NULL,
            market_total REAL NOT NULL,
            edge REAL NOT NULL,
            tier TEXT NOT NULL,
            decision TEXT NOT NULL,
            mode TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            actual_away INTEGER NULL,
            actual_home INTEGER NULL,
            actual_total INTEGER NULL,
            is_win INTEGER NULL,
            profit REAL NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(league, game_date, matchup)
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_status ON predictions(status);
        CREATE INDEX IF NOT EXISTS idx_predictions_date ON predictions(league, game_date);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}
