use hoops_engine::audit::{FinalScore, GradedRow, TotalOutcome, grade_prediction, summarize};

fn score(away: u32, home: u32) -> FinalScore {
    FinalScore {
        away: "Away".to_string(),
        home: "Home".to_string(),
        away_score: away,
        home_score: home,
    }
}

fn row(league: &str, is_win: Option<bool>, profit: f64) -> GradedRow {
    GradedRow {
        league: league.to_string(),
        game_date: "2026-01-15".to_string(),
        matchup: "Away @ Home".to_string(),
        model_total: 0.0,
        market_total: 0.0,
        actual_total: 0,
        is_win,
        profit,
    }
}

#[test]
fn grades_direction_against_market() {
    let over_win = grade_prediction(230.0, 220.5, &score(112, 115));
    assert_eq!(over_win.direction, TotalOutcome::Over);
    assert_eq!(over_win.outcome, TotalOutcome::Over);
    assert_eq!(over_win.is_win, Some(true));
    assert_eq!(over_win.profit, 0.91);

    let under_loss = grade_prediction(210.0, 220.5, &score(112, 115));
    assert_eq!(under_loss.direction, TotalOutcome::Under);
    assert_eq!(under_loss.is_win, Some(false));
    assert_eq!(under_loss.profit, -1.0);

    let push = grade_prediction(230.0, 227.0, &score(112, 115));
    assert_eq!(push.outcome, TotalOutcome::Push);
    assert_eq!(push.is_win, None);
    assert_eq!(push.profit, 0.0);
}

#[test]
fn model_equal_to_market_reads_as_under() {
    let pick = grade_prediction(220.0, 220.0, &score(100, 100));
    assert_eq!(pick.direction, TotalOutcome::Under);
    assert_eq!(pick.is_win, Some(true));
}

#[test]
fn summary_counts_per_league_sorted() {
    let rows = vec![
        row("nba", Some(true), 0.91),
        row("ncaa", Some(false), -1.0),
        row("nba", Some(true), 0.91),
        row("nba", Some(false), -1.0),
        row("nba", None, 0.0),
    ];
    let summary = summarize(&rows);
    assert_eq!(summary.len(), 2);

    let nba = &summary[0];
    assert_eq!(nba.league, "nba");
    assert_eq!((nba.wins, nba.losses, nba.pushes), (2, 1, 1));
    assert_eq!(nba.profit, 0.82);
    assert_eq!(nba.win_pct, 66.7);
    assert_eq!(nba.roi, 27.3);

    let ncaa = &summary[1];
    assert_eq!(ncaa.league, "ncaa");
    assert_eq!(ncaa.win_pct, 0.0);
    assert_eq!(ncaa.roi, -100.0);
}

#[test]
fn all_pushes_have_zero_rates() {
    let summary = summarize(&[row("euro", None, 0.0)]);
    assert_eq!(summary[0].pushes, 1);
    assert_eq!(summary[0].win_pct, 0.0);
    assert_eq!(summary[0].roi, 0.0);
}
