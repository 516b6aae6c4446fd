use chrono::NaiveDate;

use hoops_engine::league_config::{League, LeagueConfig};
use hoops_engine::sheet::{RawSources, ScheduledGame, build_sheet};
use hoops_engine::stats::{TeamStats, TeamTable};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn team(off: f64, def: f64, pace: f64) -> TeamStats {
    TeamStats {
        adj_off: Some(off),
        adj_def: Some(def),
        adj_t: Some(pace),
        ..TeamStats::default()
    }
}

fn game(away: &str, home: &str, total: Option<f64>) -> ScheduledGame {
    ScheduledGame {
        away: away.to_string(),
        home: home.to_string(),
        total,
        date: Some(date(2026, 2, 1)),
        ..ScheduledGame::default()
    }
}

fn stats() -> TeamTable {
    TeamTable::from([
        ("Duke".to_string(), team(124.0, 92.0, 70.0)),
        ("North Carolina".to_string(), team(112.0, 101.0, 72.0)),
        ("Saint Mary's (CA)".to_string(), team(110.0, 98.0, 62.0)),
        ("Gonzaga".to_string(), TeamStats::default()),
    ])
}

#[test]
fn standardizes_in_schedule_order_and_drops_unresolved() {
    let config = LeagueConfig::builtin(League::Ncaa);
    let stats = stats();
    let schedule = vec![
        game("Duke", "North Carolina", Some(151.5)),
        game("Nowhere State", "Duke", Some(140.0)),
        game("St Mary's", "Gonzaga", None),
    ];
    let sheet = build_sheet(
        &config,
        date(2026, 2, 1),
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        Some(hoops_engine::team_names::basketball_aliases()),
    );

    assert_eq!(sheet.len(), 2);
    let first = &sheet[0];
    assert_eq!(first.label(), "Duke @ North Carolina");
    assert_eq!(first.pace_adjustment, Some(71.0));
    assert_eq!(first.efficiency_adjustment, Some((124.0 + 101.0 + 112.0 + 92.0) / 4.0));
    assert_eq!(first.market_total, Some(151.5));
    assert!(first.is_elite_offense);
    assert!(first.is_strong_defense);

    let second = &sheet[1];
    assert_eq!(second.team, "Saint Mary's (CA)");
    assert_eq!(second.opponent, "Gonzaga");
    assert_eq!(second.market_total, Some(config.sheet.default_market_total));
}

#[test]
fn missing_ratings_fall_back_to_pivots() {
    let config = LeagueConfig::builtin(League::Ncaa);
    let stats = TeamTable::from([
        ("Gonzaga".to_string(), TeamStats::default()),
        ("Baylor".to_string(), TeamStats::default()),
    ]);
    let schedule = vec![game("Gonzaga", "Baylor", Some(150.0))];
    let sheet = build_sheet(
        &config,
        date(2026, 2, 1),
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        None,
    );
    let m = &sheet[0];
    assert_eq!(m.pace_adjustment, Some(config.pace_pivot));
    assert_eq!(m.efficiency_adjustment, Some(config.eff_pivot));
    assert!(!m.is_elite_offense);
    assert!(!m.is_strong_defense);
}

#[test]
fn games_on_other_dates_are_skipped() {
    let config = LeagueConfig::builtin(League::Ncaa);
    let stats = stats();
    let mut later = game("Duke", "Gonzaga", Some(150.0));
    later.date = Some(date(2026, 2, 2));
    let undated = ScheduledGame {
        date: None,
        ..game("Gonzaga", "Duke", Some(149.0))
    };
    let schedule = vec![later, undated];
    let sheet = build_sheet(
        &config,
        date(2026, 2, 1),
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        None,
    );
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet[0].team, "Gonzaga");
}

#[test]
fn three_point_volume_only_where_configured() {
    let mut nba_stats = TeamTable::new();
    nba_stats.insert(
        "Boston Celtics".to_string(),
        TeamStats {
            fg3a: Some(42.0),
            ..team(120.0, 110.0, 99.0)
        },
    );
    nba_stats.insert("Miami Heat".to_string(), team(112.0, 111.0, 96.0));
    let schedule = vec![game("Boston Celtics", "Miami Heat", Some(220.0))];
    let sources = RawSources {
        stats: &nba_stats,
        schedule: &schedule,
    };

    let nba = LeagueConfig::builtin(League::Nba);
    let sheet = build_sheet(&nba, date(2026, 2, 1), &sources, None);
    assert_eq!(sheet[0].three_pa_total, Some(42.0 + nba.sheet.default_fg3a));

    let euro = LeagueConfig::builtin(League::Euro);
    let sheet = build_sheet(&euro, date(2026, 2, 1), &sources, None);
    assert_eq!(sheet[0].three_pa_total, None);
}

#[test]
fn back_to_back_flags_carry_through() {
    let config = LeagueConfig::builtin(League::Ncaa);
    let stats = stats();
    let schedule = vec![ScheduledGame {
        away_b2b: true,
        home_b2b: true,
        is_neutral: true,
        ..game("Duke", "Gonzaga", Some(150.0))
    }];
    let sheet = build_sheet(
        &config,
        date(2026, 2, 1),
        &RawSources {
            stats: &stats,
            schedule: &schedule,
        },
        None,
    );
    let m = &sheet[0];
    assert!(m.is_b2b_team && m.is_b2b_opp && m.is_b2b_both);
    assert!(m.is_neutral);
}
