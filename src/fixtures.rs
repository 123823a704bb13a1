use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::form::Outcome;
use crate::metric_table::{Cell, MetricTable, RowRef};

/// Column names of a match table. Defaults follow the `fact_match` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchColumns {
    pub home_id: String,
    pub away_id: String,
    pub home_goals: String,
    pub away_goals: String,
    pub kickoff: String,
}

impl Default for MatchColumns {
    fn default() -> Self {
        Self {
            home_id: "home_team_id".to_string(),
            away_id: "away_team_id".to_string(),
            home_goals: "home_score".to_string(),
            away_goals: "away_score".to_string(),
            kickoff: "match_date".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueStats {
    pub matches: usize,
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeAwayStats {
    pub home: VenueStats,
    pub away: VenueStats,
    /// Home minus away, per metric.
    pub differential: BTreeMap<String, f64>,
}

fn is_home(row: &RowRef<'_>, team_id: i64, columns: &MatchColumns) -> bool {
    row.get(&columns.home_id).is_some_and(|c| c.matches_id(team_id))
}

fn is_away(row: &RowRef<'_>, team_id: i64, columns: &MatchColumns) -> bool {
    row.get(&columns.away_id).is_some_and(|c| c.matches_id(team_id))
}

/// Splits a match table into the team's home fixtures and away fixtures.
pub fn split_home_away(
    matches: &MetricTable,
    team_id: i64,
    columns: &MatchColumns,
) -> (MetricTable, MetricTable) {
    let home = matches.filter(|row| is_home(row, team_id, columns));
    let away = matches.filter(|row| is_away(row, team_id, columns));
    (home, away)
}

/// Per-metric means at home and away plus the home-minus-away differential.
///
/// An empty venue averages to 0.0. Metrics missing from the table are
/// skipped with a warning.
pub fn home_away_stats(
    matches: &MetricTable,
    team_id: i64,
    metrics: &[&str],
    columns: &MatchColumns,
) -> HomeAwayStats {
    let (home_df, away_df) = split_home_away(matches, team_id, columns);
    let mut out = HomeAwayStats {
        home: VenueStats {
            matches: home_df.len(),
            metrics: BTreeMap::new(),
        },
        away: VenueStats {
            matches: away_df.len(),
            metrics: BTreeMap::new(),
        },
        differential: BTreeMap::new(),
    };

    for metric in metrics {
        if !matches.has_column(metric) {
            warn!(metric, "metric not found in match table");
            continue;
        }
        let home_avg = venue_mean(&home_df, metric);
        let away_avg = venue_mean(&away_df, metric);
        out.home
            .metrics
            .insert(metric.to_string(), crate::round_dp(home_avg, 2));
        out.away
            .metrics
            .insert(metric.to_string(), crate::round_dp(away_avg, 2));
        out.differential
            .insert(metric.to_string(), crate::round_dp(home_avg - away_avg, 2));
    }
    out
}

fn venue_mean(table: &MetricTable, metric: &str) -> f64 {
    let values = table.present_values(metric).unwrap_or_default();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// One outcome per row from two goal columns; rows missing a score give `None`.
pub fn match_results(
    table: &MetricTable,
    goals_for_col: &str,
    goals_against_col: &str,
) -> Result<Vec<Option<Outcome>>> {
    let goals_for = table.numbers(goals_for_col)?;
    let goals_against = table.numbers(goals_against_col)?;
    Ok(goals_for
        .into_iter()
        .zip(goals_against)
        .map(|(gf, ga)| match (gf, ga) {
            (Some(gf), Some(ga)) => Some(Outcome::from_goals(gf, ga)),
            _ => None,
        })
        .collect())
}

/// Adds `goals_for`, `goals_against` and `result` columns seen from
/// `team_id`'s side. Rows the team did not play, or without a score, get nulls.
pub fn with_team_perspective(
    matches: &MetricTable,
    team_id: i64,
    columns: &MatchColumns,
) -> Result<MetricTable> {
    let mut goals_for = Vec::with_capacity(matches.len());
    let mut goals_against = Vec::with_capacity(matches.len());
    let mut result = Vec::with_capacity(matches.len());
    for row in matches.rows() {
        let hg = row.number(&columns.home_goals);
        let ag = row.number(&columns.away_goals);
        let (gf, ga) = if is_home(&row, team_id, columns) {
            (hg, ag)
        } else if is_away(&row, team_id, columns) {
            (ag, hg)
        } else {
            (None, None)
        };
        let outcome = gf
            .zip(ga)
            .map(|(gf, ga)| Outcome::from_goals(gf, ga).to_string());
        goals_for.push(Cell::from(gf));
        goals_against.push(Cell::from(ga));
        result.push(Cell::from(outcome));
    }
    matches
        .with_column("goals_for", goals_for)?
        .with_column("goals_against", goals_against)?
        .with_column("result", result)
}

/// The team's results in kickoff order, oldest first.
///
/// Unscored fixtures are dropped. Rows whose kickoff cannot be parsed sort
/// ahead of dated rows and otherwise keep table order.
pub fn team_results(matches: &MetricTable, team_id: i64, columns: &MatchColumns) -> Vec<Outcome> {
    let mut rows: Vec<(Option<NaiveDateTime>, Outcome)> = Vec::new();
    for row in matches.rows() {
        let home = is_home(&row, team_id, columns);
        if !home && !is_away(&row, team_id, columns) {
            continue;
        }
        let (Some(hg), Some(ag)) = (
            row.number(&columns.home_goals),
            row.number(&columns.away_goals),
        ) else {
            continue;
        };
        let (gf, ga) = if home { (hg, ag) } else { (ag, hg) };
        let kickoff = row.get(&columns.kickoff).and_then(parse_kickoff);
        rows.push((kickoff, Outcome::from_goals(gf, ga)));
    }
    rows.sort_by_key(|(kickoff, _)| *kickoff);
    rows.into_iter().map(|(_, outcome)| outcome).collect()
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`, plain dates, and
/// numeric unix seconds.
pub fn parse_kickoff(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Text(raw) => {
            let s = raw.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Cell::Number(secs) if secs.is_finite() => {
            DateTime::from_timestamp(*secs as i64, 0).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kickoff_formats() {
        let a = parse_kickoff(&Cell::from("2024-08-17")).unwrap();
        let b = parse_kickoff(&Cell::from("2024-08-17 15:00:00")).unwrap();
        let c = parse_kickoff(&Cell::from("2024-08-17T15:00:00+01:00")).unwrap();
        assert!(a < b);
        let expected = NaiveDate::from_ymd_opt(2024, 8, 17)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        assert_eq!(c, expected);
        assert!(parse_kickoff(&Cell::from("soon")).is_none());
    }
}
