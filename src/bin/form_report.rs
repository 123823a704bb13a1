use anyhow::{Context, Result};

use matchday_stats::config::EngineConfig;
use matchday_stats::form::{self, PointsTable};
use matchday_stats::{logging, report};

fn main() -> Result<()> {
    logging::init();
    let config = EngineConfig::load();

    let raw = std::env::args()
        .nth(1)
        .context("usage: form_report <results, e.g. WWDLW> [window]")?;
    let window = match std::env::args().nth(2) {
        Some(w) => w.parse::<usize>().context("window must be a positive integer")?,
        None => config.form_window,
    };

    let results = form::parse_results(&raw);
    let summary = report::form_summary(&results, window.max(1), &PointsTable::default());

    println!("Form: {}", summary.sequence);
    println!("Score: {:.2}", summary.score);
    println!(
        "W/D/L: {:.2}% / {:.2}% / {:.2}%",
        summary.win_rate, summary.draw_rate, summary.loss_rate
    );
    println!("Points: {} from {} matches", summary.points, summary.matches);
    match summary.streak.outcome {
        Some(outcome) => println!("Streak: {}{}", summary.streak.length, outcome),
        None => println!("Streak: -"),
    }
    Ok(())
}
