use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use hoops_engine::league_config::{League, LeagueConfig};
use hoops_engine::sheet::Matchup;
use hoops_engine::stats::InjuryNote;
use hoops_engine::total_engine::{EngineMode, GameTotalEngine};

#[derive(Debug, serde::Deserialize)]
struct BacktestCase {
    #[serde(default)]
    id: Option<String>,
    /// Full config override; wins over `league`.
    #[serde(default)]
    config: Option<LeagueConfig>,
    #[serde(default)]
    league: Option<League>,
    #[serde(default)]
    mode: EngineMode,
    matchup: Matchup,
    #[serde(default)]
    injuries: Vec<InjuryNote>,
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/backtest_case.json"));

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let case: BacktestCase =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;

    let config = match case.config {
        Some(config) => config,
        None => LeagueConfig::builtin(case.league.unwrap_or(League::Nba)),
    };
    let engine = GameTotalEngine::new(config, case.mode)?;
    let result = engine.calculate_total(&case.matchup, &case.injuries);

    println!("Case: {}", case.id.as_deref().unwrap_or("backtest"));
    println!("Matchup: {}", case.matchup.label());
    for line in &result.trace {
        println!("  {line}");
    }
    println!("Safe total: {:.2}", result.safe_total);
    println!("Model total: {:.2}", result.final_model_total);
    println!("Market: {:.1}", result.market_total);
    println!("Edge: {:+.2}", result.edge);
    println!("Tier: {}", result.mode.as_str());
    println!("Decision: {}", result.decision.as_str());

    Ok(())
}
