use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stats::round_to;

const WIN_PROFIT: f64 = 0.91;
const LOSS_PROFIT: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TotalOutcome {
    Over,
    Under,
    Push,
}

impl TotalOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TotalOutcome::Over => "OVER",
            TotalOutcome::Under => "UNDER",
            TotalOutcome::Push => "PUSH",
        }
    }
}

/// Final score for one game, as a results feed reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    #[serde(alias = "away_team")]
    pub away: String,
    #[serde(alias = "home_team")]
    pub home: String,
    pub away_score: u32,
    pub home_score: u32,
}

impl FinalScore {
    pub fn total(&self) -> u32 {
        self.away_score + self.home_score
    }

    pub fn key(&self) -> String {
        matchup_key_parts(&self.away, &self.home)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedPick {
    pub direction: TotalOutcome,
    pub outcome: TotalOutcome,
    /// `None` on a push.
    pub is_win: Option<bool>,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedRow {
    pub league: String,
    pub game_date: String,
    pub matchup: String,
    pub model_total: f64,
    pub market_total: f64,
    pub actual_total: u32,
    pub is_win: Option<bool>,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub league: String,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub profit: f64,
    pub win_pct: f64,
    pub roi: f64,
}

pub fn grade_total(market_total: f64, away_score: u32, home_score: u32) -> TotalOutcome {
    let actual = f64::from(away_score + home_score);
    if actual > market_total {
        TotalOutcome::Over
    } else if actual < market_total {
        TotalOutcome::Under
    } else {
        TotalOutcome::Push
    }
}

pub fn grade_prediction(model_total: f64, market_total: f64, score: &FinalScore) -> GradedPick {
    let direction = if model_total > market_total {
        TotalOutcome::Over
    } else {
        TotalOutcome::Under
    };
    let outcome = grade_total(market_total, score.away_score, score.home_score);
    let is_win = (outcome != TotalOutcome::Push).then_some(direction == outcome);
    let profit = match is_win {
        Some(true) => WIN_PROFIT,
        Some(false) => LOSS_PROFIT,
        None => 0.0,
    };
    GradedPick {
        direction,
        outcome,
        is_win,
        profit,
    }
}

/// `"Away @ Home"` -> `"away_home"`.
pub fn matchup_key(matchup: &str) -> Option<String> {
    let (away, home) = matchup.split_once('@')?;
    if home.contains('@') {
        return None;
    }
    Some(matchup_key_parts(away, home))
}

fn matchup_key_parts(away: &str, home: &str) -> String {
    format!("{}_{}", away.trim().to_lowercase(), home.trim().to_lowercase())
}

pub fn summarize(rows: &[GradedRow]) -> Vec<LeagueSummary> {
    let mut by_league: BTreeMap<&str, (u32, u32, u32, f64)> = BTreeMap::new();
    for row in rows {
        let entry = by_league.entry(row.league.as_str()).or_default();
        match row.is_win {
            Some(true) => entry.0 += 1,
            Some(false) => entry.1 += 1,
            None => entry.2 += 1,
        }
        entry.3 += row.profit;
    }

    by_league
        .into_iter()
        .map(|(league, (wins, losses, pushes, profit))| {
            let decided = f64::from(wins + losses);
            let (win_pct, roi) = if decided > 0.0 {
                (f64::from(wins) / decided * 100.0, profit / decided * 100.0)
            } else {
                (0.0, 0.0)
            };
            LeagueSummary {
                league: league.to_string(),
                wins,
                losses,
                pushes,
                profit: round_to(profit, 2),
                win_pct: round_to(win_pct, 1),
                roi: round_to(roi, 1),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchup_key_lowercases_and_trims() {
        assert_eq!(
            matchup_key("Los Angeles Lakers @ Boston Celtics").as_deref(),
            Some("los angeles lakers_boston celtics")
        );
        assert_eq!(matchup_key("no separator"), None);
        assert_eq!(matchup_key("a @ b @ c"), None);
    }

    #[test]
    fn grade_total_push_on_exact_line() {
        assert_eq!(grade_total(220.0, 110, 110), TotalOutcome::Push);
        assert_eq!(grade_total(220.5, 110, 110), TotalOutcome::Under);
        assert_eq!(grade_total(219.5, 110, 110), TotalOutcome::Over);
    }
}
