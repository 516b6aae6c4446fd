use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::league_config::League;
use crate::prop_engine::{PlayerId, PlayerInput, StatLine};
use crate::sheet::ScheduledGame;
use crate::stats::{InjuryReport, TeamTable};

/// Root of the on-disk JSON files the fetchers write, one set per league.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct FlatPlayer {
    #[serde(default)]
    id: Option<PlayerId>,
    name: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    pos: Option<String>,
    #[serde(flatten)]
    line: StatLine,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, league: League, kind: &str) -> PathBuf {
        self.root.join(format!("{}_{kind}.json", league.key()))
    }

    pub fn team_stats(&self, league: League) -> Result<TeamTable> {
        self.load_or_default(&self.path_for(league, "stats"))
    }

    pub fn schedule(&self, league: League) -> Result<Vec<ScheduledGame>> {
        self.load_or_default(&self.path_for(league, "matchups"))
    }

    pub fn injuries(&self, league: League) -> Result<InjuryReport> {
        self.load_or_default(&self.path_for(league, "injury_notes"))
    }

    pub fn players(&self, league: League) -> Result<Vec<PlayerInput>> {
        let path = self.path_for(league, "player_stats");
        let raw: Vec<Value> = self.load_or_default(&path)?;
        raw.into_iter()
            .enumerate()
            .map(|(idx, value)| {
                parse_player_value(value)
                    .with_context(|| format!("player #{idx} in {}", path.display()))
            })
            .collect()
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            warn!(path = %path.display(), "data file missing, using empty set");
            return Ok(T::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read data file {}", path.display()))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(T::default());
        }
        let value = serde_json::from_str::<T>(trimmed)
            .with_context(|| format!("parse data file {}", path.display()))?;
        debug!(path = %path.display(), "data file loaded");
        Ok(value)
    }
}

/// Accepts split `{seasonal, recent}` records and flat per-game records.
/// Flat stats stand in for both the season and the recent window.
pub fn parse_player_value(mut value: Value) -> Result<PlayerInput> {
    if value.get("seasonal").is_some() {
        if let Some(obj) = value.as_object_mut()
            && obj.get("recent").is_some_and(Value::is_null)
        {
            obj.remove("recent");
        }
        let has_recent = value.get("recent").is_some();
        let mut player: PlayerInput =
            serde_json::from_value(value).context("invalid split player record")?;
        if !has_recent {
            player.recent = player.seasonal;
        }
        return Ok(player);
    }
    let flat: FlatPlayer = serde_json::from_value(value).context("invalid flat player record")?;
    Ok(PlayerInput {
        id: flat.id,
        name: flat.name,
        team: flat.team,
        pos: flat.pos,
        seasonal: flat.line,
        recent: flat.line,
    })
}
