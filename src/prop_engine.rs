use serde::{Deserialize, Serialize};

use crate::stats::{AllowedStats, InjuryNote, round_to};
use crate::total_engine::EngineMode;

const SEASON_WEIGHT: f64 = 0.40;
const RECENT_WEIGHT: f64 = 0.60;

const CROSS_POSITION_PTS_BUMP: f64 = 0.05;
const GUARD_PTS_BUMP: f64 = 0.12;
const GUARD_AST_BUMP: f64 = 0.15;
const BIG_PTS_BUMP: f64 = 0.08;
const BIG_REB_BUMP: f64 = 0.15;

/// Per-game counting stats. Absent keys read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLine {
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    #[serde(alias = "threes", alias = "3pm")]
    pub fg3m: f64,
    pub fgm: f64,
    pub fga: f64,
    pub ftm: f64,
    pub fta: f64,
}

impl StatLine {
    fn zip_with(self, other: StatLine, f: impl Fn(f64, f64) -> f64) -> StatLine {
        StatLine {
            pts: f(self.pts, other.pts),
            reb: f(self.reb, other.reb),
            ast: f(self.ast, other.ast),
            stl: f(self.stl, other.stl),
            blk: f(self.blk, other.blk),
            tov: f(self.tov, other.tov),
            fg3m: f(self.fg3m, other.fg3m),
            fgm: f(self.fgm, other.fgm),
            fga: f(self.fga, other.fga),
            ftm: f(self.ftm, other.ftm),
            fta: f(self.fta, other.fta),
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> StatLine {
        self.zip_with(StatLine::default(), |v, _| f(v))
    }

    /// Scoring stats follow the team total, volume stats follow pace.
    fn scale_environment(&mut self, factor: f64, vol_factor: f64) {
        for v in [&mut self.pts, &mut self.fgm, &mut self.fga, &mut self.ftm, &mut self.fta] {
            *v *= factor;
        }
        for v in [
            &mut self.reb,
            &mut self.ast,
            &mut self.stl,
            &mut self.blk,
            &mut self.tov,
            &mut self.fg3m,
        ] {
            *v *= vol_factor;
        }
    }

    fn sanitized(self) -> StatLine {
        self.map(|v| if v.is_finite() { v } else { 0.0 })
    }
}

/// Player ids are numeric in NBA feeds and codes like `"P003733"` in European ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Number(u64),
    Code(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    #[serde(default)]
    pub id: Option<PlayerId>,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub seasonal: StatLine,
    #[serde(default)]
    pub recent: StatLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropContext {
    pub factor: f64,
    pub vol_factor: f64,
    pub opp_allowed: Option<AllowedStats>,
    pub prop_regression: f64,
    pub league_avg_ast: f64,
    pub league_avg_reb: f64,
}

impl Default for PropContext {
    fn default() -> Self {
        Self {
            factor: 1.0,
            vol_factor: 1.0,
            opp_allowed: None,
            prop_regression: 0.95,
            league_avg_ast: 25.0,
            league_avg_reb: 44.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub name: String,
    pub projection: StatLine,
    pub seasonal: StatLine,
    pub recent: StatLine,
    pub trace: Vec<String>,
}

/// A dual position such as "G-F" counts as both a guard and a big.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    guard: bool,
    big: bool,
}

fn position(pos: Option<&str>) -> Position {
    let pos = pos.unwrap_or("G").to_uppercase();
    Position {
        guard: pos.contains('G'),
        big: pos.contains('F') || pos.contains('C'),
    }
}

fn ratio_or_one(value: Option<f64>, average: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && average > 0.0 => v / average,
        _ => 1.0,
    }
}

fn finite_multiplier(v: f64) -> f64 {
    if v.is_finite() { v } else { 1.0 }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerPropEngine {
    mode: EngineMode,
}

impl PlayerPropEngine {
    pub fn new(mode: EngineMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn project_player(
        &self,
        player: &PlayerInput,
        context: &PropContext,
        teammate_injuries: &[InjuryNote],
    ) -> PlayerProjection {
        let mut trace = Vec::with_capacity(5);
        let seasonal = player.seasonal.sanitized();
        let recent = player.recent.sanitized();

        let mut p = seasonal.zip_with(recent, |s, r| s * SEASON_WEIGHT + r * RECENT_WEIGHT);
        trace.push(format!(
            "Baseline (40/60): Pts {:.1} | Reb {:.1} | Ast {:.1}",
            p.pts, p.reb, p.ast
        ));

        let factor = finite_multiplier(context.factor);
        let vol_factor = finite_multiplier(context.vol_factor);
        p.scale_environment(factor, vol_factor);
        trace.push(format!(
            "Environment: Pts {:.1} | Reb {:.1} | Ast {:.1} (factor {factor:.2}, pace {vol_factor:.2})",
            p.pts, p.reb, p.ast
        ));

        if let Some(allowed) = &context.opp_allowed {
            let ast_mod = ratio_or_one(allowed.ast, context.league_avg_ast);
            let reb_mod = ratio_or_one(allowed.reb, context.league_avg_reb);
            p.ast *= ast_mod;
            p.reb *= reb_mod;
            trace.push(format!("Defensive funnel: Ast x{ast_mod:.2} | Reb x{reb_mod:.2}"));
        }

        let own = position(player.pos.as_deref());
        let (mut bump_pts, mut bump_ast, mut bump_reb) = (0.0, 0.0, 0.0);
        for injury in teammate_injuries {
            if !injury.is_ruled_out() || injury.player.eq_ignore_ascii_case(&player.name) {
                continue;
            }
            let missing = position(injury.pos.as_deref());
            // Guard overlap wins over big overlap for dual positions.
            if own.guard && missing.guard {
                bump_pts += GUARD_PTS_BUMP;
                bump_ast += GUARD_AST_BUMP;
            } else if own.big && missing.big {
                bump_pts += BIG_PTS_BUMP;
                bump_reb += BIG_REB_BUMP;
            } else {
                bump_pts += CROSS_POSITION_PTS_BUMP;
            }
        }
        if bump_pts > 0.0 {
            let shot_mult = 1.0 + bump_pts;
            for v in [&mut p.pts, &mut p.fgm, &mut p.fga, &mut p.ftm, &mut p.fta, &mut p.fg3m] {
                *v *= shot_mult;
            }
            p.ast *= 1.0 + bump_ast;
            p.reb *= 1.0 + bump_reb;
            trace.push(format!(
                "Usage vacuum: Pts +{:.0}% | Ast +{:.0}% | Reb +{:.0}%",
                bump_pts * 100.0,
                bump_ast * 100.0,
                bump_reb * 100.0
            ));
        }

        let prop_reg = finite_multiplier(context.prop_regression);
        p = p.map(|v| round_to(v * prop_reg, 2));
        trace.push(format!("Final regression: {prop_reg:.2}x"));

        PlayerProjection {
            name: player.name.clone(),
            projection: p,
            seasonal,
            recent,
            trace,
        }
    }
}
