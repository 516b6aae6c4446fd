use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Team stats keyed by the team name the stats source uses, in file order.
pub type TeamTable = IndexMap<String, TeamStats>;

/// Injury notes keyed by team name.
pub type InjuryReport = IndexMap<String, Vec<InjuryNote>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FourFactors {
    #[serde(default)]
    pub efg: f64,
    #[serde(default, alias = "to")]
    pub tov: f64,
    #[serde(default, alias = "or")]
    pub orb: f64,
    #[serde(default)]
    pub ftr: f64,
}

/// Per-game stats a defense concedes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowedStats {
    #[serde(default)]
    pub pts: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(default, alias = "adj_o", alias = "offensive_rating")]
    pub adj_off: Option<f64>,
    #[serde(default, alias = "adj_d", alias = "defensive_rating")]
    pub adj_def: Option<f64>,
    #[serde(default, alias = "pace")]
    pub adj_t: Option<f64>,
    #[serde(default)]
    pub fg3a: Option<f64>,
    #[serde(default)]
    pub conf: Option<String>,
    #[serde(default, alias = "points_for_average")]
    pub ppg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub four_factors: Option<FourFactors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<AllowedStats>,
}

impl TeamStats {
    pub fn off_or(&self, pivot: f64) -> f64 {
        finite_or(self.adj_off, pivot)
    }

    pub fn def_or(&self, pivot: f64) -> f64 {
        finite_or(self.adj_def, pivot)
    }

    pub fn pace_or(&self, pivot: f64) -> f64 {
        finite_or(self.adj_t, pivot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryNote {
    #[serde(alias = "name")]
    pub player: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub pos: Option<String>,
}

impl InjuryNote {
    pub fn is_ruled_out(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("out") || status.contains("doubtful")
    }
}

/// `value` when present and finite, otherwise `default`.
pub fn finite_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruled_out_matches_substrings() {
        let note = |status: &str| InjuryNote {
            player: "P".into(),
            status: status.into(),
            note: String::new(),
            pos: None,
        };
        assert!(note("Out").is_ruled_out());
        assert!(note("OUT (knee)").is_ruled_out());
        assert!(note("Doubtful").is_ruled_out());
        assert!(!note("Questionable").is_ruled_out());
        assert!(!note("Probable").is_ruled_out());
    }

    #[test]
    fn team_stats_accepts_source_aliases() {
        let raw = r#"{"offensive_rating":118.2,"defensive_rating":109.9,"pace":81.5}"#;
        let stats: TeamStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.adj_off, Some(118.2));
        assert_eq!(stats.def_or(0.0), 109.9);
        assert_eq!(stats.pace_or(0.0), 81.5);
        assert_eq!(stats.fg3a, None);
    }

    #[test]
    fn finite_or_rejects_nan() {
        assert_eq!(finite_or(Some(f64::NAN), 3.0), 3.0);
        assert_eq!(finite_or(None, 3.0), 3.0);
        assert_eq!(finite_or(Some(1.5), 3.0), 1.5);
    }
}
