use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::league_config::{ConfigError, LeagueConfig};
use crate::sheet::Matchup;
use crate::stats::{InjuryNote, finite_or, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Statistical inputs only.
    #[default]
    Safe,
    /// Safe mode plus injury-note context, under the governance filter.
    Full,
}

impl EngineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineMode::Safe => "safe",
            EngineMode::Full => "full",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(EngineMode::Safe),
            "full" => Ok(EngineMode::Full),
            other => Err(format!("unknown mode {other:?}, expected safe or full")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTier {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "NONE")]
    None,
}

impl EdgeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeTier::A => "A",
            EdgeTier::B => "B",
            EdgeTier::None => "NONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "PLAY")]
    Play,
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "PASS (Governance Filter)")]
    GovernancePass,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Play => "PLAY",
            Decision::Pass => "PASS",
            Decision::GovernancePass => "PASS (Governance Filter)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lean {
    #[serde(rename = "OVER")]
    Over,
    #[serde(rename = "UNDER")]
    Under,
    #[serde(rename = "NONE")]
    None,
}

impl Lean {
    pub fn from_edge(edge: f64) -> Self {
        if edge > 0.0 {
            Lean::Over
        } else if edge < 0.0 {
            Lean::Under
        } else {
            Lean::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub final_model_total: f64,
    pub safe_total: f64,
    pub market_total: f64,
    pub edge: f64,
    pub mode: EdgeTier,
    pub decision: Decision,
    pub lean: Lean,
    pub notes_applied: bool,
    pub trace: Vec<String>,
}

/// Game total engine for one league. Holds nothing but its config and mode,
/// so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct GameTotalEngine {
    config: LeagueConfig,
    mode: EngineMode,
}

impl GameTotalEngine {
    pub fn new(config: LeagueConfig, mode: EngineMode) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, mode })
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn calculate_total(&self, matchup: &Matchup, injury_notes: &[InjuryNote]) -> PredictionResult {
        let c = &self.config;
        let s = &c.situational;
        let mut trace = Vec::with_capacity(10);

        let pace = finite_or(matchup.pace_adjustment, c.pace_pivot);
        let eff = finite_or(matchup.efficiency_adjustment, c.eff_pivot);
        let market = finite_or(matchup.market_total, c.sheet.default_market_total);

        // Two teams scoring at `eff` per 100 possessions over `pace` possessions.
        let baseline = (eff * pace / 100.0) * 2.0;
        trace.push(format!(
            "Step 1: Rate baseline ({eff:.1} eff @ {pace:.1} pace) = {baseline:.2}"
        ));
        let mut total = baseline;

        let pace_impact = (pace - c.pace_pivot) * c.pace_delta_weight;
        total += pace_impact;
        trace.push(format!(
            "Step 2: Pace delta ({pace:.1} vs pivot {:.1}) -> {pace_impact:+.2}",
            c.pace_pivot
        ));

        let mut eff_mod = 0.0;
        if matchup.is_elite_offense {
            eff_mod += s.elite_offense_boost;
        }
        if matchup.is_strong_defense {
            eff_mod += s.strong_defense_drag;
        }
        total += eff_mod;
        trace.push(format!(
            "Step 3: Efficiency modifiers (elite offense: {}, strong defense: {}) -> {eff_mod:+.2}",
            matchup.is_elite_offense, matchup.is_strong_defense
        ));

        let pre_regression = total;
        total *= c.regression_factor;
        trace.push(format!(
            "Step 4: Regression {:.2}x ({pre_regression:.2}) -> {total:.2}",
            c.regression_factor
        ));

        let hca = if matchup.is_neutral { 0.0 } else { c.hca_total_bump };
        total += hca;
        if matchup.is_neutral {
            trace.push("Step 5: Neutral site -> +0.00".to_string());
        } else {
            trace.push(format!("Step 5: Home court -> {hca:+.2}"));
        }

        let situational = self.situational_layer(matchup, &mut trace);
        total += situational;
        trace.push(format!("Step 6: Situational layer -> {situational:+.2}"));

        let safe_total = total;
        trace.push(format!("Safe mode result: {safe_total:.2}"));

        let mut final_total = safe_total;
        let mut notes_applied = false;
        if self.mode == EngineMode::Full && !injury_notes.is_empty() {
            let ruled_out = injury_notes.iter().filter(|n| n.is_ruled_out()).count();
            let impact = ruled_out as f64 * c.star_leverage.star_out;
            final_total += impact;
            notes_applied = true;
            trace.push(format!(
                "Step 7: Injury context ({ruled_out} of {} notes out/doubtful) -> {impact:+.2}",
                injury_notes.len()
            ));
        }

        let edge = final_total - market;
        let abs_edge = edge.abs();
        let tier = if abs_edge >= c.thresholds.mode_a {
            EdgeTier::A
        } else if abs_edge >= c.thresholds.mode_b {
            EdgeTier::B
        } else {
            EdgeTier::None
        };
        let mut decision = if tier == EdgeTier::None {
            Decision::Pass
        } else {
            Decision::Play
        };

        // Context may resize an edge the stats already support, never create one.
        let safe_edge = safe_total - market;
        if tier != EdgeTier::None && safe_edge.abs() < c.thresholds.mode_b {
            decision = Decision::GovernancePass;
            trace.push(format!(
                "Governance: safe edge {safe_edge:+.2} below {:.1}, decision held at PASS",
                c.thresholds.mode_b
            ));
        }
        let lean = Lean::from_edge(edge);
        trace.push(format!(
            "Edge: {final_total:.2} vs market {market:.1} = {edge:+.2} -> {tier:?} / {}",
            decision.as_str()
        ));

        debug!(
            league = %c.name,
            matchup = %matchup.label(),
            total = final_total,
            market,
            edge,
            decision = decision.as_str(),
            "total computed"
        );

        PredictionResult {
            final_model_total: round_to(final_total, 2),
            safe_total: round_to(safe_total, 2),
            market_total: market,
            edge: round_to(edge, 2),
            mode: tier,
            decision,
            lean,
            notes_applied,
            trace,
        }
    }

    fn situational_layer(&self, matchup: &Matchup, trace: &mut Vec<String>) -> f64 {
        let c = &self.config;
        let s = &c.situational;
        let mut impact = 0.0;

        if let (Some((high, low)), Some(three_pa)) = (c.three_point_rule(), matchup.three_pa_total)
            && three_pa.is_finite()
        {
            if three_pa > high {
                impact += s.three_pt_vol_boost;
                trace.push(format!("  3PA volume {three_pa:.1} > {high:.1} -> {:+.2}", s.three_pt_vol_boost));
            } else if three_pa < low {
                impact += s.three_pt_vol_drag;
                trace.push(format!("  3PA volume {three_pa:.1} < {low:.1} -> {:+.2}", s.three_pt_vol_drag));
            }
        }

        if let Some(bias_table) = &c.conf_bias {
            let conf = matchup.conf.as_deref().unwrap_or("DEFAULT");
            let bias = bias_table
                .get(conf)
                .or_else(|| bias_table.get("DEFAULT"))
                .copied()
                .unwrap_or(0.0);
            impact += bias;
            trace.push(format!("  Conference bias ({conf}) -> {bias:+.2}"));
        }

        if matchup.is_b2b_both {
            impact += s.double_b2b_penalty;
            trace.push(format!("  Double back-to-back -> {:+.2}", s.double_b2b_penalty));
        } else if matchup.is_b2b_team || matchup.is_b2b_opp {
            impact += s.b2b_fatigue_penalty;
            trace.push(format!("  Back-to-back fatigue -> {:+.2}", s.b2b_fatigue_penalty));
        }

        impact
    }
}
