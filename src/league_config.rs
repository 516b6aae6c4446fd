use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read league config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse league config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid league config {league}: {reason}")]
    Invalid { league: String, reason: String },
    #[error("unknown league: {0}")]
    UnknownLeague(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nba,
    Ncaa,
    Euro,
    #[serde(rename = "eurocup")]
    EuroCup,
    Nbl,
    Acb,
}

impl League {
    pub const ALL: [League; 6] = [
        League::Nba,
        League::Ncaa,
        League::Euro,
        League::EuroCup,
        League::Nbl,
        League::Acb,
    ];

    pub fn key(self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Ncaa => "ncaa",
            League::Euro => "euro",
            League::EuroCup => "eurocup",
            League::Nbl => "nbl",
            League::Acb => "acb",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for League {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        League::ALL
            .into_iter()
            .find(|l| l.key() == key)
            .ok_or_else(|| ConfigError::UnknownLeague(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Situational {
    pub elite_offense_boost: f64,
    pub strong_defense_drag: f64,
    pub three_pt_vol_boost: f64,
    pub three_pt_vol_drag: f64,
    // Combined 3PA bounds; the volume rule is off unless both are set.
    pub three_pt_high: Option<f64>,
    pub three_pt_low: Option<f64>,
    pub b2b_fatigue_penalty: f64,
    pub double_b2b_penalty: f64,
}

impl Default for Situational {
    fn default() -> Self {
        Self {
            elite_offense_boost: 2.0,
            strong_defense_drag: -3.0,
            three_pt_vol_boost: 0.0,
            three_pt_vol_drag: 0.0,
            three_pt_high: None,
            three_pt_low: None,
            b2b_fatigue_penalty: 0.0,
            double_b2b_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub mode_a: f64,
    pub mode_b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarLeverage {
    pub star_out: f64,
}

impl Default for StarLeverage {
    fn default() -> Self {
        Self { star_out: -2.5 }
    }
}

/// Constants the sheet builder needs to turn raw stats into a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRules {
    pub elite_offense_cutoff: f64,
    pub strong_defense_cutoff: f64,
    pub default_market_total: f64,
    pub default_fg3a: f64,
}

impl Default for SheetRules {
    fn default() -> Self {
        Self {
            elite_offense_cutoff: 120.0,
            strong_defense_cutoff: 110.0,
            default_market_total: 230.5,
            default_fg3a: 35.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropRules {
    pub season_avg_total: f64,
    pub league_avg_ast: f64,
    pub league_avg_reb: f64,
    pub prop_regression: f64,
}

impl Default for PropRules {
    fn default() -> Self {
        Self {
            season_avg_total: 230.0,
            league_avg_ast: 25.0,
            league_avg_reb: 44.0,
            prop_regression: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub pace_pivot: f64,
    pub eff_pivot: f64,
    pub pace_delta_weight: f64,
    pub regression_factor: f64,
    #[serde(default)]
    pub hca_total_bump: f64,
    #[serde(default)]
    pub situational: Situational,
    pub thresholds: Thresholds,
    #[serde(default)]
    pub conf_bias: Option<IndexMap<String, f64>>,
    #[serde(default)]
    pub star_leverage: StarLeverage,
    #[serde(default)]
    pub sheet: SheetRules,
    #[serde(default)]
    pub props: PropRules,
}

impl LeagueConfig {
    pub fn builtin(league: League) -> Self {
        match league {
            League::Nba => Self {
                name: "NBA".to_string(),
                pace_pivot: 100.0,
                eff_pivot: 115.0,
                pace_delta_weight: 1.5,
                regression_factor: 0.92,
                hca_total_bump: 2.5,
                situational: Situational {
                    three_pt_vol_boost: 1.5,
                    three_pt_vol_drag: -2.0,
                    three_pt_high: Some(75.0),
                    three_pt_low: Some(65.0),
                    b2b_fatigue_penalty: -2.0,
                    double_b2b_penalty: -4.0,
                    ..Situational::default()
                },
                thresholds: Thresholds {
                    mode_a: 7.5,
                    mode_b: 4.5,
                },
                conf_bias: None,
                star_leverage: StarLeverage { star_out: -2.5 },
                sheet: SheetRules::default(),
                props: PropRules::default(),
            },
            League::Ncaa => Self {
                name: "NCAA".to_string(),
                pace_pivot: 68.0,
                eff_pivot: 105.0,
                pace_delta_weight: 0.8,
                regression_factor: 0.94,
                hca_total_bump: 1.5,
                situational: Situational::default(),
                thresholds: Thresholds {
                    mode_a: 8.0,
                    mode_b: 4.0,
                },
                conf_bias: Some(
                    [
                        ("ACC", 1.5),
                        ("B10", 1.5),
                        ("B12", 2.0),
                        ("BE", 1.5),
                        ("SEC", 2.0),
                        ("P12", 1.0),
                        ("Amer", 0.5),
                        ("MWC", 0.5),
                        ("A10", 0.5),
                        ("WCC", 0.5),
                        ("DEFAULT", -1.0),
                    ]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                ),
                star_leverage: StarLeverage { star_out: -1.5 },
                sheet: SheetRules {
                    elite_offense_cutoff: 115.0,
                    strong_defense_cutoff: 100.0,
                    default_market_total: 145.5,
                    default_fg3a: 22.0,
                },
                props: PropRules {
                    season_avg_total: 145.0,
                    league_avg_ast: 13.0,
                    league_avg_reb: 35.0,
                    prop_regression: 0.95,
                },
            },
            League::Euro => Self {
                name: "EURO".to_string(),
                pace_pivot: 72.0,
                eff_pivot: 110.0,
                pace_delta_weight: 1.0,
                regression_factor: 0.93,
                hca_total_bump: 2.0,
                situational: Situational::default(),
                thresholds: Thresholds {
                    mode_a: 6.5,
                    mode_b: 4.0,
                },
                conf_bias: None,
                star_leverage: StarLeverage { star_out: -2.0 },
                sheet: SheetRules {
                    elite_offense_cutoff: 120.0,
                    strong_defense_cutoff: 105.0,
                    default_market_total: 160.0,
                    default_fg3a: 25.0,
                },
                props: PropRules {
                    season_avg_total: 160.0,
                    league_avg_ast: 17.0,
                    league_avg_reb: 35.0,
                    prop_regression: 0.95,
                },
            },
            League::EuroCup => Self {
                name: "EUROCUP".to_string(),
                pace_pivot: 73.0,
                eff_pivot: 111.0,
                pace_delta_weight: 1.0,
                regression_factor: 0.93,
                hca_total_bump: 2.0,
                situational: Situational::default(),
                thresholds: Thresholds {
                    mode_a: 6.5,
                    mode_b: 4.0,
                },
                conf_bias: None,
                star_leverage: StarLeverage { star_out: -2.0 },
                sheet: SheetRules {
                    elite_offense_cutoff: 120.0,
                    strong_defense_cutoff: 105.0,
                    default_market_total: 165.0,
                    default_fg3a: 25.0,
                },
                props: PropRules {
                    season_avg_total: 165.0,
                    league_avg_ast: 17.0,
                    league_avg_reb: 35.0,
                    prop_regression: 0.95,
                },
            },
            League::Nbl => Self {
                name: "NBL".to_string(),
                pace_pivot: 80.0,
                eff_pivot: 110.0,
                pace_delta_weight: 1.0,
                regression_factor: 0.93,
                hca_total_bump: 2.0,
                situational: Situational::default(),
                thresholds: Thresholds {
                    mode_a: 7.0,
                    mode_b: 4.0,
                },
                conf_bias: None,
                star_leverage: StarLeverage { star_out: -2.0 },
                sheet: SheetRules {
                    elite_offense_cutoff: 118.0,
                    strong_defense_cutoff: 104.0,
                    default_market_total: 176.0,
                    default_fg3a: 28.0,
                },
                props: PropRules {
                    season_avg_total: 176.0,
                    league_avg_ast: 19.0,
                    league_avg_reb: 38.0,
                    prop_regression: 0.95,
                },
            },
            League::Acb => Self {
                name: "ACB".to_string(),
                pace_pivot: 74.0,
                eff_pivot: 110.0,
                pace_delta_weight: 1.0,
                regression_factor: 0.93,
                hca_total_bump: 2.0,
                situational: Situational::default(),
                thresholds: Thresholds {
                    mode_a: 6.5,
                    mode_b: 4.0,
                },
                conf_bias: None,
                star_leverage: StarLeverage { star_out: -2.0 },
                sheet: SheetRules {
                    elite_offense_cutoff: 118.0,
                    strong_defense_cutoff: 104.0,
                    default_market_total: 165.0,
                    default_fg3a: 26.0,
                },
                props: PropRules {
                    season_avg_total: 165.0,
                    league_avg_ast: 16.0,
                    league_avg_reb: 35.0,
                    prop_regression: 0.95,
                },
            },
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: LeagueConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// `{dir}/{league}.json` when present, otherwise the built-in constants.
    pub fn load_or_builtin(dir: Option<&Path>, league: League) -> Result<Self, ConfigError> {
        if let Some(dir) = dir {
            let path = dir.join(format!("{}.json", league.key()));
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::builtin(league))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            league: self.name.clone(),
            reason,
        };

        for (label, value) in [
            ("pace_pivot", self.pace_pivot),
            ("eff_pivot", self.eff_pivot),
            ("sheet.default_market_total", self.sheet.default_market_total),
            ("props.season_avg_total", self.props.season_avg_total),
            ("props.league_avg_ast", self.props.league_avg_ast),
            ("props.league_avg_reb", self.props.league_avg_reb),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{label} must be positive, got {value}")));
            }
        }
        if !(self.regression_factor.is_finite()
            && self.regression_factor > 0.0
            && self.regression_factor <= 1.5)
        {
            return Err(invalid(format!(
                "regression_factor out of range: {}",
                self.regression_factor
            )));
        }
        let t = self.thresholds;
        if !(t.mode_b.is_finite() && t.mode_a.is_finite() && 0.0 <= t.mode_b && t.mode_b <= t.mode_a) {
            return Err(invalid(format!(
                "thresholds must satisfy 0 <= mode_b <= mode_a, got a={} b={}",
                t.mode_a, t.mode_b
            )));
        }

        let s = &self.situational;
        let additive = [
            self.pace_delta_weight,
            self.hca_total_bump,
            s.elite_offense_boost,
            s.strong_defense_drag,
            s.three_pt_vol_boost,
            s.three_pt_vol_drag,
            s.b2b_fatigue_penalty,
            s.double_b2b_penalty,
            self.star_leverage.star_out,
            self.props.prop_regression,
        ];
        if additive.iter().any(|v| !v.is_finite()) {
            return Err(invalid("non-finite modifier".to_string()));
        }
        if let Some(bias) = &self.conf_bias
            && let Some((conf, v)) = bias.iter().find(|(_, v)| !v.is_finite())
        {
            return Err(invalid(format!("conf_bias {conf} is not finite: {v}")));
        }
        Ok(())
    }

    pub fn three_point_rule(&self) -> Option<(f64, f64)> {
        match (self.situational.three_pt_high, self.situational.three_pt_low) {
            (Some(high), Some(low)) => Some((high, low)),
            _ => None,
        }
    }
}
