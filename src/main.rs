use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use matchday_stats::config::EngineConfig;
use matchday_stats::fixtures::{self, HomeAwayStats, MatchColumns};
use matchday_stats::form::PointsTable;
use matchday_stats::report::{self, FormSummary, TeamReport};
use matchday_stats::stat_type::StatType;
use matchday_stats::{export, logging, mart_store};

const USAGE: &str = "usage: matchday_stats --season <id> --team <id> [--stat attack|defense|possession|discipline] [--db <path>] [--xlsx <path>]";

#[derive(Debug, Serialize)]
struct Output {
    report: TeamReport,
    form: FormSummary,
    home_away: HomeAwayStats,
}

fn main() -> Result<()> {
    logging::init();
    let mut config = EngineConfig::load();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }
    let Some(season_id) = arg_value(&args, "--season") else {
        bail!("missing --season\n{USAGE}");
    };
    let season_id: i64 = season_id.parse().context("--season must be an integer")?;
    let Some(team_id) = arg_value(&args, "--team") else {
        bail!("missing --team\n{USAGE}");
    };
    let team_id: i64 = team_id.parse().context("--team must be an integer")?;
    let stat_type = match arg_value(&args, "--stat") {
        Some(raw) => raw.parse::<StatType>()?,
        None => StatType::Attack,
    };
    if let Some(path) = arg_value(&args, "--db") {
        config.db_path = PathBuf::from(path);
    }

    let conn = mart_store::open_db(&config.db_path)?;
    let population = mart_store::load_season_table(&conn, stat_type, season_id)?;
    let report = report::build_team_report(&population, team_id, stat_type, &config)?;

    let columns = MatchColumns::default();
    let matches = mart_store::load_team_matches(&conn, season_id, team_id)?;
    let results = fixtures::team_results(&matches, team_id, &columns);
    let form = report::form_summary(&results, config.form_window, &PointsTable::default());
    let perspective = fixtures::with_team_perspective(&matches, team_id, &columns)?;
    let home_away = fixtures::home_away_stats(
        &perspective,
        team_id,
        &["goals_for", "goals_against"],
        &columns,
    );

    if let Some(path) = arg_value(&args, "--xlsx") {
        let path = PathBuf::from(path);
        let summary = export::export_team_report(&path, &report)?;
        eprintln!(
            "Wrote {} ({} metrics, {} radar axes)",
            path.display(),
            summary.metrics,
            summary.radar_axes
        );
    }

    let out = Output {
        report,
        form,
        home_away,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Value of `--name value` or `--name=value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
