use tracing::warn;

use crate::error::{Result, StatsError};
use crate::fixtures::MatchColumns;
use crate::metric_table::MetricTable;

fn side_column(metric: &str, side: &str) -> String {
    format!("{metric}_{side}")
}

/// Opponent's `metric` for every row the team played in; other rows are `None`.
///
/// When the team is at home the opponent is the away side, so the value is
/// read from `<metric>_away`, and vice versa.
pub fn opponent_strength(
    matches: &MetricTable,
    team_id: i64,
    metric: &str,
    columns: &MatchColumns,
) -> Result<Vec<Option<f64>>> {
    let away_col = side_column(metric, "away");
    let home_col = side_column(metric, "home");
    for col in [&away_col, &home_col, &columns.home_id, &columns.away_id] {
        if !matches.has_column(col) {
            return Err(StatsError::UnknownColumn(col.clone()));
        }
    }

    Ok(matches
        .rows()
        .map(|row| {
            let home = row.get(&columns.home_id).is_some_and(|c| c.matches_id(team_id));
            let away = row.get(&columns.away_id).is_some_and(|c| c.matches_id(team_id));
            if home {
                row.number(&away_col)
            } else if away {
                row.number(&home_col)
            } else {
                None
            }
        })
        .collect())
}

/// Scales `metric_col` by `strength / league_average`.
///
/// Without an explicit average the mean of the strength column is used. A
/// zero (or undefined) average leaves the metric unchanged.
pub fn adjust_for_sos(
    table: &MetricTable,
    metric_col: &str,
    strength_col: &str,
    league_average: Option<f64>,
) -> Result<Vec<Option<f64>>> {
    let metric = table.numbers(metric_col)?;
    let strength = table.numbers(strength_col)?;

    let average = match league_average {
        Some(avg) => Some(avg),
        None => mean(strength.iter().flatten().copied()),
    };
    let Some(average) = average.filter(|a| *a != 0.0) else {
        return Ok(metric);
    };

    Ok(metric
        .into_iter()
        .zip(strength)
        .map(|(m, s)| Some(m? * s? / average))
        .collect())
}

/// Mean opponent strength over the team's matches, 0.0 when it has none.
pub fn sos_rating(
    matches: &MetricTable,
    team_id: i64,
    metric: &str,
    columns: &MatchColumns,
) -> Result<f64> {
    let strengths = opponent_strength(matches, team_id, metric, columns)?;
    match mean(strengths.into_iter().flatten()) {
        Some(avg) => Ok(crate::round_dp(avg, 2)),
        None => {
            warn!(team_id, metric, "no opponent strength values for team");
            Ok(0.0)
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
