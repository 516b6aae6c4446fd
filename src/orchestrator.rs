use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data_files::DataDir;
use crate::league_config::{League, LeagueConfig};
use crate::prop_engine::{PlayerId, PlayerInput, PlayerPropEngine, PropContext, StatLine};
use crate::sheet::{Matchup, RawSources, build_sheet};
use crate::stats::{InjuryNote, InjuryReport, TeamStats, TeamTable, finite_or, round_to};
use crate::team_names::{AliasTable, basketball_aliases, expand_tricode, resolve_team_name};
use crate::total_engine::{Decision, EngineMode, GameTotalEngine, PredictionResult};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub props_per_team: usize,
    pub parallel: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            props_per_team: 10,
            parallel: false,
        }
    }
}

pub struct RunInputs<'a> {
    pub league: League,
    pub date: NaiveDate,
    /// Full stats table; injury keys and player teams resolve against it.
    pub stats: &'a TeamTable,
    pub sheet: &'a [Matchup],
    pub players: &'a [PlayerInput],
    pub injuries: &'a InjuryReport,
    pub aliases: Option<&'a AliasTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropRow {
    pub team_label: String,
    pub team: String,
    #[serde(default)]
    pub id: Option<PlayerId>,
    pub name: String,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(flatten)]
    pub projection: StatLine,
    pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub matchup: String,
    pub away: String,
    pub home: String,
    #[serde(default)]
    pub away_stats: Option<TeamStats>,
    #[serde(default)]
    pub home_stats: Option<TeamStats>,
    pub prediction: PredictionResult,
    pub props: Vec<PropRow>,
    pub injuries: Vec<InjuryNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueReport {
    pub league: League,
    pub mode: EngineMode,
    pub date: NaiveDate,
    pub generated_at: String,
    pub games: Vec<GameReport>,
}

impl LeagueReport {
    pub fn plays(&self) -> impl Iterator<Item = &GameReport> {
        self.games
            .iter()
            .filter(|g| g.prediction.decision == Decision::Play)
    }
}

/// Environment multipliers for one side's players, taken from the game total.
pub fn derive_prop_context(
    config: &LeagueConfig,
    matchup: &Matchup,
    prediction: &PredictionResult,
    opponent: Option<&TeamStats>,
) -> PropContext {
    let props = &config.props;
    let pace = finite_or(matchup.pace_adjustment, config.pace_pivot);
    PropContext {
        factor: prediction.final_model_total / props.season_avg_total,
        vol_factor: pace / config.pace_pivot,
        opp_allowed: opponent.and_then(|s| s.allowed.clone()),
        prop_regression: props.prop_regression,
        league_avg_ast: props.league_avg_ast,
        league_avg_reb: props.league_avg_reb,
    }
}

pub fn run_league(
    engine: &GameTotalEngine,
    prop_engine: &PlayerPropEngine,
    inputs: &RunInputs<'_>,
    options: &RunOptions,
) -> LeagueReport {
    let process = |matchup: &Matchup| process_matchup(engine, prop_engine, inputs, options, matchup);
    let games: Vec<GameReport> = if options.parallel {
        inputs.sheet.par_iter().map(process).collect()
    } else {
        inputs.sheet.iter().map(process).collect()
    };

    let plays = games
        .iter()
        .filter(|g| g.prediction.decision == Decision::Play)
        .count();
    info!(
        league = %inputs.league,
        mode = %engine.mode(),
        date = %inputs.date,
        games = games.len(),
        plays,
        "league run complete"
    );

    LeagueReport {
        league: inputs.league,
        mode: engine.mode(),
        date: inputs.date,
        generated_at: Utc::now().to_rfc3339(),
        games,
    }
}

/// Load a league's files, build the sheet and run both engines.
pub fn run_from_data_dir(
    data: &DataDir,
    league: League,
    config: LeagueConfig,
    mode: EngineMode,
    date: NaiveDate,
    options: &RunOptions,
) -> Result<LeagueReport> {
    let stats = data.team_stats(league)?;
    let schedule = data.schedule(league)?;
    let players = data.players(league)?;
    let injuries = if mode == EngineMode::Full {
        data.injuries(league)?
    } else {
        InjuryReport::new()
    };

    let aliases = basketball_aliases();
    let sheet = build_sheet(
        &config,
        date,
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        Some(aliases),
    );
    info!(league = %league, scheduled = schedule.len(), resolved = sheet.len(), "daily sheet built");

    let engine = GameTotalEngine::new(config, mode)?;
    let prop_engine = PlayerPropEngine::new(mode);
    let inputs = RunInputs {
        league,
        date,
        stats: &stats,
        sheet: &sheet,
        players: &players,
        injuries: &injuries,
        aliases: Some(aliases),
    };
    Ok(run_league(&engine, &prop_engine, &inputs, options))
}

fn process_matchup(
    engine: &GameTotalEngine,
    prop_engine: &PlayerPropEngine,
    inputs: &RunInputs<'_>,
    options: &RunOptions,
    matchup: &Matchup,
) -> GameReport {
    let full = engine.mode() == EngineMode::Full;
    let away_notes = if full {
        notes_for_team(inputs, &matchup.team)
    } else {
        Vec::new()
    };
    let home_notes = if full {
        notes_for_team(inputs, &matchup.opponent)
    } else {
        Vec::new()
    };
    let game_notes: Vec<InjuryNote> = away_notes.iter().chain(&home_notes).cloned().collect();

    let prediction = engine.calculate_total(matchup, &game_notes);

    let mut props = Vec::new();
    if options.props_per_team > 0 && !inputs.players.is_empty() {
        let sides = [
            ("A", &matchup.team, &away_notes, matchup.home_stats.as_ref()),
            ("H", &matchup.opponent, &home_notes, matchup.away_stats.as_ref()),
        ];
        for (label, side, notes, opponent) in sides {
            let context = derive_prop_context(engine.config(), matchup, &prediction, opponent);
            for player in top_players(inputs, side, options.props_per_team) {
                let projected = prop_engine.project_player(player, &context, notes);
                props.push(PropRow {
                    team_label: label.to_string(),
                    team: side.clone(),
                    id: player.id.clone(),
                    name: player.name.clone(),
                    pos: player.pos.clone(),
                    projection: projected.projection.map(|v| round_to(v, 1)),
                    trace: projected.trace,
                });
            }
        }
    }

    GameReport {
        matchup: matchup.label(),
        away: matchup.team.clone(),
        home: matchup.opponent.clone(),
        away_stats: matchup.away_stats.clone(),
        home_stats: matchup.home_stats.clone(),
        prediction,
        props,
        injuries: game_notes,
    }
}

/// Canonical stats key for a feed's team field, which may be a tricode.
fn canonical_team<'a>(inputs: &RunInputs<'a>, raw: &str) -> Option<&'a str> {
    let name = expand_tricode(inputs.league, raw);
    resolve_team_name(name, inputs.stats, inputs.aliases)
}

fn notes_for_team(inputs: &RunInputs<'_>, team: &str) -> Vec<InjuryNote> {
    inputs
        .injuries
        .iter()
        .filter(|(key, _)| canonical_team(inputs, key) == Some(team))
        .flat_map(|(_, notes)| notes.iter().cloned())
        .collect()
}

fn top_players<'a>(inputs: &RunInputs<'a>, side: &str, limit: usize) -> Vec<&'a PlayerInput> {
    let mut roster: Vec<&PlayerInput> = inputs
        .players
        .iter()
        .filter(|p| canonical_team(inputs, &p.team) == Some(side))
        .collect();
    roster.sort_by(|a, b| b.seasonal.pts.total_cmp(&a.seasonal.pts));
    roster.truncate(limit);
    roster
}
