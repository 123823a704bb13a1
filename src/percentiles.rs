use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StatsError};
use crate::metric_table::{Direction, EntityMetrics, MetricTable};

/// Identifier columns that are never treated as performance metrics.
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "team_id",
    "team_name",
    "season_id",
    "season_name",
    "season_year",
];

/// Tie convention for percentile-of-score.
///
/// With `a` the count strictly below the score and `b` the count at or
/// below it, over a population of `n`:
/// `Weak = b/n`, `Strict = a/n`, `Mean = (a+b)/2n`, and `Rank` averages the
/// percentage ranks of every tied position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileKind {
    #[default]
    Weak,
    Strict,
    Rank,
    Mean,
}

impl FromStr for PercentileKind {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Ok(PercentileKind::Weak),
            "strict" => Ok(PercentileKind::Strict),
            "rank" => Ok(PercentileKind::Rank),
            "mean" => Ok(PercentileKind::Mean),
            _ => Err(StatsError::UnknownPercentileKind(s.to_string())),
        }
    }
}

/// Percentile (0-100) of `score` within `population`; `None` for an empty
/// population or a NaN score.
pub fn percentile_of_score(population: &[f64], score: f64, kind: PercentileKind) -> Option<f64> {
    if population.is_empty() || score.is_nan() {
        return None;
    }
    let n = population.len() as f64;
    let below = population.iter().filter(|v| **v < score).count() as f64;
    let at_or_below = population.iter().filter(|v| **v <= score).count() as f64;
    let pct = match kind {
        PercentileKind::Weak => at_or_below / n * 100.0,
        PercentileKind::Strict => below / n * 100.0,
        PercentileKind::Mean => (below + at_or_below) * (50.0 / n),
        PercentileKind::Rank => {
            let plus_one = if below < at_or_below { 1.0 } else { 0.0 };
            (below + at_or_below + plus_one) * (50.0 / n)
        }
    };
    Some(pct)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileOptions {
    pub kind: PercentileKind,
    pub exclude: Vec<String>,
}

impl Default for PercentileOptions {
    fn default() -> Self {
        Self {
            kind: PercentileKind::default(),
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PercentileOptions {
    fn is_excluded(&self, column: &str) -> bool {
        self.exclude.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueComparison {
    pub averages: BTreeMap<String, f64>,
    pub percentiles: BTreeMap<String, Option<f64>>,
}

impl LeagueComparison {
    pub fn average(&self, metric: &str) -> Option<f64> {
        self.averages.get(metric).copied()
    }

    pub fn percentile(&self, metric: &str) -> Option<f64> {
        self.percentiles.get(metric).copied().flatten()
    }
}

/// Population means and entity percentiles for every metric column.
///
/// Metric columns are the non-excluded columns holding at least one number.
/// Percentiles honour the table's metric direction, so a lower-is-better
/// metric ranks the smallest value highest. A missing entity value, or a
/// column that cannot be ranked, yields a `None` percentile; the latter is
/// logged.
pub fn league_stats_and_percentiles(
    population: &MetricTable,
    entity: &EntityMetrics,
    options: &PercentileOptions,
) -> LeagueComparison {
    let mut out = LeagueComparison::default();

    for column in population.columns() {
        if options.is_excluded(column) || !population.is_numeric_column(column) {
            continue;
        }
        let values = population.present_values(column).unwrap_or_default();
        if !values.is_empty() {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            out.averages.insert(column.clone(), mean);
        }

        let pct = match entity.number(column) {
            Some(score) => match column_percentile(population, column, score, options.kind) {
                Ok(p) => Some(crate::round_dp(p, 1)),
                Err(err) => {
                    warn!(column = column.as_str(), error = %err, "failed to calculate percentile");
                    None
                }
            },
            None => None,
        };
        out.percentiles.insert(column.clone(), pct);
    }
    out
}

fn column_percentile(
    population: &MetricTable,
    column: &str,
    score: f64,
    kind: PercentileKind,
) -> Result<f64> {
    if population.has_text(column) {
        return Err(StatsError::NonNumericColumn(column.to_string()));
    }
    let values = population
        .present_values(column)
        .ok_or_else(|| StatsError::UnknownColumn(column.to_string()))?;
    directed_percentile(&values, score, population.direction(column), kind)
        .ok_or_else(|| StatsError::EmptyPopulation(column.to_string()))
}

/// Average-rank percentile of every row (ties share their mean rank).
///
/// With `ascending` the smallest value ranks first; otherwise the largest
/// does. Null cells stay null and do not count towards the population.
pub fn percentile_rank(
    table: &MetricTable,
    column: &str,
    ascending: bool,
) -> Result<Vec<Option<f64>>> {
    let values = table.numbers(column)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let n = present.len() as f64;

    Ok(values
        .iter()
        .map(|value| {
            let v = (*value)?;
            let ahead = present
                .iter()
                .filter(|o| if ascending { **o < v } else { **o > v })
                .count() as f64;
            let tied = present.iter().filter(|o| **o == v).count() as f64;
            let avg_rank = ahead + (tied + 1.0) / 2.0;
            Some(crate::round_dp(avg_rank / n * 100.0, 2))
        })
        .collect())
}

/// Direction-aware percentile over a bare slice: for lower-is-better values
/// the smallest value scores highest.
pub fn directed_percentile(
    population: &[f64],
    score: f64,
    direction: Direction,
    kind: PercentileKind,
) -> Option<f64> {
    let oriented: Vec<f64> = population.iter().map(|v| direction.orient(*v)).collect();
    percentile_of_score(&oriented, direction.orient(score), kind)
}
