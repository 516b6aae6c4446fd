use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{Days, Local};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hoops_engine::audit::FinalScore;
use hoops_engine::data_files::DataDir;
use hoops_engine::league_config::{League, LeagueConfig};
use hoops_engine::orchestrator::{GameReport, LeagueReport, RunOptions, run_from_data_dir};
use hoops_engine::sheet::resolve_target_date;
use hoops_engine::store::{PredictionStore, default_db_path};
use hoops_engine::total_engine::EngineMode;

#[derive(Parser)]
#[command(name = "hoops_engine")]
#[command(about = "Basketball game totals and player prop projections", long_about = None)]
struct Cli {
    /// Directory holding `{league}_stats.json`, `{league}_matchups.json` and friends.
    #[arg(long, env = "HOOPS_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Directory with `{league}.json` config overrides.
    #[arg(long, env = "HOOPS_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[arg(long, env = "HOOPS_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engines over a day's slate.
    Predict {
        /// One league; every league when omitted.
        #[arg(short, long)]
        league: Option<League>,
        #[arg(short, long, default_value = "safe")]
        mode: EngineMode,
        /// `today`, `tomorrow`, `yesterday` or YYYY-MM-DD.
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        trace: bool,
        #[arg(long)]
        json: bool,
        /// Players projected per side; 0 disables props.
        #[arg(long, default_value_t = 10)]
        props: usize,
        #[arg(long)]
        save: bool,
        #[arg(long)]
        parallel: bool,
    },
    /// Grade stored predictions against final scores.
    Grade {
        #[arg(short, long)]
        league: League,
        #[arg(short, long, default_value = "yesterday")]
        date: String,
        /// JSON array of `{away, home, away_score, home_score}`.
        #[arg(short, long)]
        results: PathBuf,
    },
    /// Win/loss and ROI per league over graded predictions.
    Summary,
    /// Print the effective league config.
    Config {
        #[arg(short, long)]
        league: League,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let cli = Cli::parse();
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Predict {
            league,
            mode,
            date,
            trace,
            json,
            props,
            save,
            parallel,
        } => {
            let date = resolve_target_date(date.as_deref(), today)?;
            let data = DataDir::new(&cli.data_dir);
            let options = RunOptions {
                props_per_team: props,
                parallel,
            };
            let leagues = league.map(|l| vec![l]).unwrap_or_else(|| League::ALL.to_vec());

            let mut reports = Vec::with_capacity(leagues.len());
            for league in leagues {
                let config = LeagueConfig::load_or_builtin(cli.config_dir.as_deref(), league)?;
                match run_from_data_dir(&data, league, config, mode, date, &options) {
                    Ok(report) => reports.push(report),
                    Err(err) => warn!(league = %league, error = %format!("{err:#}"), "league run failed"),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report, trace);
                }
            }

            if save {
                let mut store = open_store(cli.db_path.as_deref())?;
                for report in &reports {
                    store.save_report(report)?;
                }
            }
        }
        Commands::Grade {
            league,
            date,
            results,
        } => {
            let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
            let date = resolve_target_date(Some(&date), yesterday)?;
            let raw = fs::read_to_string(&results)
                .with_context(|| format!("read results file {}", results.display()))?;
            let scores: Vec<FinalScore> = serde_json::from_str(&raw)
                .with_context(|| format!("parse results file {}", results.display()))?;
            let mut store = open_store(cli.db_path.as_deref())?;
            let graded = store.apply_results(league, date, &scores)?;
            println!("graded {graded} {league} games for {date}");
        }
        Commands::Summary => {
            let store = open_store(cli.db_path.as_deref())?;
            let summary = store.summary()?;
            if summary.is_empty() {
                println!("no graded predictions yet");
            }
            for row in summary {
                println!(
                    "{:<8} {:>3}-{:<3} push {:<3} win {:>5.1}%  roi {:>6.1}%  units {:+.2}",
                    row.league, row.wins, row.losses, row.pushes, row.win_pct, row.roi, row.profit
                );
            }
        }
        Commands::Config { league } => {
            let config = LeagueConfig::load_or_builtin(cli.config_dir.as_deref(), league)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: Option<&Path>) -> Result<PredictionStore> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_db_path().ok_or_else(|| anyhow!("no cache dir; pass --db-path"))?,
    };
    info!(path = %path.display(), "opening prediction store");
    PredictionStore::open(&path)
}

fn print_report(report: &LeagueReport, trace: bool) {
    println!(
        "== {} | {} | {} mode | {} games ==",
        report.league.key().to_uppercase(),
        report.date,
        report.mode,
        report.games.len()
    );
    for game in &report.games {
        print_game(game, trace);
    }
    println!();
}

fn print_game(game: &GameReport, trace: bool) {
    let p = &game.prediction;
    println!(
        "{:<48} model {:>6.1}  market {:>6.1}  edge {:>+6.2}  {:<4} {}",
        game.matchup,
        p.final_model_total,
        p.market_total,
        p.edge,
        p.mode.as_str(),
        p.decision.as_str()
    );
    if trace {
        for line in &p.trace {
            println!("    {line}");
        }
    }
    for prop in &game.props {
        let s = &prop.projection;
        println!(
            "    [{}] {:<24} pts {:>5.1}  reb {:>5.1}  ast {:>5.1}  3pm {:>4.1}",
            prop.team_label, prop.name, s.pts, s.reb, s.ast, s.fg3m
        );
        if trace {
            for line in &prop.trace {
                println!("        {line}");
            }
        }
    }
}
