use anyhow::{Context, Result, anyhow};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::league_config::LeagueConfig;
use crate::stats::{TeamStats, TeamTable, finite_or};
use crate::team_names::{AliasTable, resolve_team_name};

/// One scheduled game as the ingestion layer writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    #[serde(alias = "away_team")]
    pub away: String,
    #[serde(alias = "home_team")]
    pub home: String,
    #[serde(default, alias = "market_total")]
    pub total: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub is_neutral: bool,
    #[serde(default)]
    pub away_b2b: bool,
    #[serde(default)]
    pub home_b2b: bool,
}

/// Canonical sheet record: `team` is the away side, `opponent` the home side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub team: String,
    pub opponent: String,
    #[serde(default)]
    pub pace_adjustment: Option<f64>,
    #[serde(default)]
    pub efficiency_adjustment: Option<f64>,
    #[serde(default)]
    pub market_total: Option<f64>,
    #[serde(default)]
    pub is_elite_offense: bool,
    #[serde(default)]
    pub is_strong_defense: bool,
    #[serde(default)]
    pub is_b2b_team: bool,
    #[serde(default)]
    pub is_b2b_opp: bool,
    #[serde(default)]
    pub is_b2b_both: bool,
    #[serde(default)]
    pub is_neutral: bool,
    #[serde(default)]
    pub three_pa_total: Option<f64>,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_stats: Option<TeamStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_stats: Option<TeamStats>,
}

impl Matchup {
    pub fn label(&self) -> String {
        format!("{} @ {}", self.team, self.opponent)
    }
}

pub struct RawSources<'a> {
    pub stats: &'a TeamTable,
    pub schedule: &'a [ScheduledGame],
}

pub fn build_sheet(
    config: &LeagueConfig,
    date: NaiveDate,
    sources: &RawSources<'_>,
    aliases: Option<&AliasTable>,
) -> Vec<Matchup> {
    let mut sheet = Vec::with_capacity(sources.schedule.len());
    for game in sources.schedule {
        if let Some(game_date) = game.date
            && game_date != date
        {
            debug!(away = %game.away, home = %game.home, %game_date, "skipping game outside target date");
            continue;
        }

        let away = resolve_team_name(&game.away, sources.stats, aliases);
        let home = resolve_team_name(&game.home, sources.stats, aliases);
        let (Some(away), Some(home)) = (away, home) else {
            warn!(
                league = %config.name,
                away = %game.away,
                home = %game.home,
                away_resolved = away.is_some(),
                home_resolved = home.is_some(),
                "dropping matchup with unresolved team"
            );
            continue;
        };

        let (Some(away_stats), Some(home_stats)) = (sources.stats.get(away), sources.stats.get(home))
        else {
            continue;
        };
        sheet.push(standardize(config, game, away, away_stats, home, home_stats));
    }
    sheet
}

fn standardize(
    config: &LeagueConfig,
    game: &ScheduledGame,
    away: &str,
    a: &TeamStats,
    home: &str,
    h: &TeamStats,
) -> Matchup {
    let pace_pivot = config.pace_pivot;
    let eff_pivot = config.eff_pivot;
    let rules = &config.sheet;

    let (a_off, a_def) = (a.off_or(eff_pivot), a.def_or(eff_pivot));
    let (h_off, h_def) = (h.off_or(eff_pivot), h.def_or(eff_pivot));

    let pace = (a.pace_or(pace_pivot) + h.pace_or(pace_pivot)) / 2.0;
    // Each offense against the other defense, collapsed into one scalar.
    let efficiency = (a_off + h_def + h_off + a_def) / 4.0;

    let three_pa_total = config.three_point_rule().map(|_| {
        finite_or(a.fg3a, rules.default_fg3a) + finite_or(h.fg3a, rules.default_fg3a)
    });

    Matchup {
        team: away.to_string(),
        opponent: home.to_string(),
        pace_adjustment: Some(pace),
        efficiency_adjustment: Some(efficiency),
        market_total: Some(finite_or(game.total, rules.default_market_total)),
        is_elite_offense: a_off > rules.elite_offense_cutoff || h_off > rules.elite_offense_cutoff,
        is_strong_defense: a_def < rules.strong_defense_cutoff
            || h_def < rules.strong_defense_cutoff,
        is_b2b_team: game.away_b2b,
        is_b2b_opp: game.home_b2b,
        is_b2b_both: game.away_b2b && game.home_b2b,
        is_neutral: game.is_neutral,
        three_pa_total,
        conf: a.conf.clone(),
        start_time: game.start_time.clone(),
        away_stats: Some(a.clone()),
        home_stats: Some(h.clone()),
    }
}

/// The slate date a run targets. `None` means today.
pub fn resolve_target_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(today);
    };
    match raw.to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow!("date overflow")),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| anyhow!("date overflow")),
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid target date {raw:?}, expected YYYY-MM-DD")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_date_keywords() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(resolve_target_date(None, today).unwrap(), today);
        assert_eq!(
            resolve_target_date(Some("tomorrow"), today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
        assert_eq!(
            resolve_target_date(Some("2025-12-25"), today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
        );
        assert!(resolve_target_date(Some("12/25/2025"), today).is_err());
    }
}
