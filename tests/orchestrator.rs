use std::path::PathBuf;

use chrono::NaiveDate;

use hoops_engine::data_files::DataDir;
use hoops_engine::league_config::{League, LeagueConfig};
use hoops_engine::orchestrator::{
    LeagueReport, RunInputs, RunOptions, derive_prop_context, run_from_data_dir, run_league,
};
use hoops_engine::prop_engine::{PlayerInput, PlayerPropEngine, StatLine};
use hoops_engine::sheet::{Matchup, RawSources, ScheduledGame, build_sheet};
use hoops_engine::stats::{AllowedStats, InjuryNote, InjuryReport, TeamStats, TeamTable};
use hoops_engine::team_names::basketball_aliases;
use hoops_engine::total_engine::{EngineMode, GameTotalEngine};

fn fixtures() -> DataDir {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    DataDir::new(path)
}

fn slate_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn run(mode: EngineMode, options: RunOptions) -> LeagueReport {
    run_from_data_dir(
        &fixtures(),
        League::Nba,
        LeagueConfig::builtin(League::Nba),
        mode,
        slate_date(),
        &options,
    )
    .expect("fixture run")
}

#[test]
fn safe_run_covers_resolved_games_in_order() {
    let report = run(EngineMode::Safe, RunOptions::default());
    assert_eq!(report.league, League::Nba);
    assert_eq!(report.mode, EngineMode::Safe);
    assert_eq!(report.date, slate_date());

    let labels: Vec<&str> = report.games.iter().map(|g| g.matchup.as_str()).collect();
    assert_eq!(labels, ["Los Angeles Lakers @ Boston Celtics", "Denver Nuggets @ Miami Heat"]);
    assert!(report.games.iter().all(|g| g.injuries.is_empty()));
    assert!(report.games.iter().all(|g| !g.prediction.notes_applied));

    let first = &report.games[0];
    assert_eq!(first.prediction.market_total, 231.5);
    assert!(first.home_stats.is_some());
}

#[test]
fn props_pick_top_scorers_per_side() {
    let report = run(EngineMode::Safe, RunOptions::default());
    let names: Vec<(&str, &str)> = report.games[0]
        .props
        .iter()
        .map(|p| (p.team_label.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        names,
        [
            ("A", "LeBron James"),
            ("A", "Austin Reaves"),
            ("H", "Jayson Tatum"),
            ("H", "Derrick White"),
            ("H", "Jrue Holiday"),
        ]
    );
    assert_eq!(report.games[1].props.len(), 1);
    assert_eq!(report.games[1].props[0].name, "Nikola Jokic");

    for prop in report.games.iter().flat_map(|g| &g.props) {
        let rounded = (prop.projection.pts * 10.0).round() / 10.0;
        assert_eq!(prop.projection.pts, rounded);
    }

    let capped = run(
        EngineMode::Safe,
        RunOptions {
            props_per_team: 1,
            parallel: false,
        },
    );
    assert_eq!(capped.games[0].props.len(), 2);

    let none = run(
        EngineMode::Safe,
        RunOptions {
            props_per_team: 0,
            parallel: false,
        },
    );
    assert!(none.games.iter().all(|g| g.props.is_empty()));
}

#[test]
fn full_run_applies_side_injuries() {
    let report = run(EngineMode::Full, RunOptions::default());
    let first = &report.games[0];
    assert_eq!(first.injuries.len(), 2);
    assert!(first.prediction.notes_applied);
    assert!(first.prediction.final_model_total < first.prediction.safe_total);

    let vacuum = |name: &str| {
        first
            .props
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.trace.iter().any(|l| l.starts_with("Usage vacuum")))
            .unwrap()
    };
    assert!(vacuum("Derrick White"));
    assert!(vacuum("LeBron James"));
    assert!(!vacuum("Jrue Holiday"));

    let second = &report.games[1];
    assert!(second.injuries.is_empty());
    assert!(!second.prediction.notes_applied);
}

#[test]
fn injuries_and_rosters_stay_with_their_exact_team() {
    let rating = |off: f64, def: f64| TeamStats {
        adj_off: Some(off),
        adj_def: Some(def),
        adj_t: Some(68.0),
        conf: Some("B12".to_string()),
        ..TeamStats::default()
    };
    let stats: TeamTable = [
        ("Kansas", rating(118.0, 94.0)),
        ("Kansas State", rating(110.0, 99.0)),
        ("Baylor", rating(115.0, 97.0)),
    ]
    .into_iter()
    .map(|(name, s)| (name.to_string(), s))
    .collect();
    let schedule = [ScheduledGame {
        away: "Kansas State".to_string(),
        home: "Baylor".to_string(),
        total: Some(140.5),
        date: Some(slate_date()),
        ..ScheduledGame::default()
    }];
    let config = LeagueConfig::builtin(League::Ncaa);
    let aliases = basketball_aliases();
    let sheet = build_sheet(
        &config,
        slate_date(),
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        Some(aliases),
    );
    assert_eq!(sheet.len(), 1);

    let star_out = |player: &str| InjuryNote {
        player: player.to_string(),
        status: "Out".to_string(),
        note: String::new(),
        pos: Some("G".to_string()),
    };
    let mut injuries = InjuryReport::new();
    injuries.insert("Kansas".to_string(), vec![star_out("KU Star")]);

    let scorer = |name: &str, team: &str, pts: f64| {
        let line = StatLine {
            pts,
            ..StatLine::default()
        };
        PlayerInput {
            name: name.to_string(),
            team: team.to_string(),
            pos: Some("G".to_string()),
            seasonal: line,
            recent: line,
            ..PlayerInput::default()
        }
    };
    let players = [scorer("KU Guy", "Kansas", 20.0), scorer("K-State Guy", "Kansas St.", 15.0)];

    let engine = GameTotalEngine::new(config, EngineMode::Full).unwrap();
    let prop_engine = PlayerPropEngine::new(EngineMode::Full);
    let run_with = |injuries: &InjuryReport| {
        let inputs = RunInputs {
            league: League::Ncaa,
            date: slate_date(),
            stats: &stats,
            sheet: &sheet,
            players: &players,
            injuries,
            aliases: Some(aliases),
        };
        run_league(&engine, &prop_engine, &inputs, &RunOptions::default())
    };

    let report = run_with(&injuries);
    let game = &report.games[0];
    assert!(game.injuries.is_empty());
    assert!(!game.prediction.notes_applied);
    assert_eq!(game.prediction.final_model_total, game.prediction.safe_total);
    let props: Vec<(&str, &str)> = game
        .props
        .iter()
        .map(|p| (p.team.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(props, [("Kansas State", "K-State Guy")]);

    injuries.insert("Kansas St.".to_string(), vec![star_out("KSU Star")]);
    let report = run_with(&injuries);
    let game = &report.games[0];
    assert_eq!(game.injuries.len(), 1);
    assert_eq!(game.injuries[0].player, "KSU Star");
    assert!(game.prediction.notes_applied);
}

#[test]
fn parallel_run_matches_sequential() {
    let sequential = run(EngineMode::Full, RunOptions::default());
    let parallel = run(
        EngineMode::Full,
        RunOptions {
            parallel: true,
            ..RunOptions::default()
        },
    );
    assert_eq!(sequential.games, parallel.games);
}

#[test]
fn prop_context_tracks_total_and_pace() {
    let config = LeagueConfig::builtin(League::Nba);
    let engine = GameTotalEngine::new(config.clone(), EngineMode::Safe).unwrap();
    let matchup = Matchup {
        team: "A".to_string(),
        opponent: "B".to_string(),
        pace_adjustment: Some(105.0),
        efficiency_adjustment: Some(115.0),
        market_total: Some(230.0),
        ..Matchup::default()
    };
    let prediction = engine.calculate_total(&matchup, &[]);
    let opponent = TeamStats {
        allowed: Some(AllowedStats {
            pts: None,
            reb: Some(47.0),
            ast: None,
        }),
        ..TeamStats::default()
    };

    let context = derive_prop_context(&config, &matchup, &prediction, Some(&opponent));
    assert!((context.factor - prediction.final_model_total / config.props.season_avg_total).abs() < 1e-12);
    assert!((context.vol_factor - 105.0 / config.pace_pivot).abs() < 1e-12);
    assert_eq!(context.opp_allowed.and_then(|a| a.reb), Some(47.0));
    assert_eq!(context.prop_regression, config.props.prop_regression);

    let bare = derive_prop_context(&config, &matchup, &prediction, None);
    assert!(bare.opp_allowed.is_none());
}

#[test]
fn report_serializes_decision_labels() {
    let report = run(EngineMode::Safe, RunOptions::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["league"], "nba");
    assert_eq!(json["mode"], "safe");
    assert_eq!(json["date"], "2026-01-15");
    let decision = json["games"][0]["prediction"]["decision"].as_str().unwrap();
    assert!(["PLAY", "PASS", "PASS (Governance Filter)"].contains(&decision));
    assert!(json["games"][0]["props"][0]["pts"].is_number());

    let back: LeagueReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.games.len(), report.games.len());
    assert_eq!(back.games[0].prediction.decision, report.games[0].prediction.decision);
}
