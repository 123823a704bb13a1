use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StatsError};
use crate::metric_table::{Cell, MetricTable};

/// Suffix of the columns added by [`normalize_metrics`].
pub const NORMALIZED_SUFFIX: &str = "_normalized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    #[default]
    MinMax,
    /// Z-score mapped onto the scale so that ±3 sd spans it end to end.
    ZScore,
}

impl FromStr for NormalizeMethod {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minmax" => Ok(NormalizeMethod::MinMax),
            "zscore" => Ok(NormalizeMethod::ZScore),
            _ => Err(StatsError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMethod::MinMax => f.write_str("minmax"),
            NormalizeMethod::ZScore => f.write_str("zscore"),
        }
    }
}

/// Returns a copy of `table` with a `<column>_normalized` column for each
/// requested metric, on a `0..=scale` range.
///
/// A constant column normalizes to `scale / 2` everywhere. Null cells stay
/// null. Unknown columns are skipped with a warning.
pub fn normalize_metrics(
    table: &MetricTable,
    columns: &[&str],
    scale: f64,
    method: NormalizeMethod,
) -> Result<MetricTable> {
    let mut out = table.clone();
    for column in columns {
        if !table.has_column(column) {
            warn!(column, "column not found in table");
            continue;
        }
        let values = table.numbers(column)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let map: Box<dyn Fn(f64) -> f64> = match method {
            NormalizeMethod::MinMax => min_max(&present, scale),
            NormalizeMethod::ZScore => z_score(&present, scale),
        };
        let normalized = values
            .iter()
            .map(|v| Cell::from(v.map(|v| crate::round_dp(map(v), 2))))
            .collect();
        out = out.with_column(&format!("{column}{NORMALIZED_SUFFIX}"), normalized)?;
    }
    Ok(out)
}

fn min_max(present: &[f64], scale: f64) -> Box<dyn Fn(f64) -> f64> {
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0) {
        return Box::new(move |_| scale / 2.0);
    }
    Box::new(move |v| (v - min) / range * scale)
}

fn z_score(present: &[f64], scale: f64) -> Box<dyn Fn(f64) -> f64> {
    let Some((mean, sd)) = sample_mean_sd(present) else {
        return Box::new(move |_| scale / 2.0);
    };
    Box::new(move |v| (((v - mean) / sd + 3.0) * (scale / 6.0)).clamp(0.0, scale))
}

/// Mean and sample (n - 1) standard deviation; `None` when the spread is zero
/// or undefined.
fn sample_mean_sd(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = var.sqrt();
    (sd > 0.0).then_some((mean, sd))
}

/// Weighted per-row score; weights are divided by their total first.
///
/// Unknown columns are skipped with a warning (their weight still counts
/// towards the total). A row missing any included value scores `None`.
pub fn composite_score(table: &MetricTable, weights: &[(&str, f64)]) -> Result<Vec<Option<f64>>> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total == 0.0 {
        return Err(StatsError::ZeroTotalWeight);
    }

    let mut scores: Vec<Option<f64>> = vec![Some(0.0); table.len()];
    for (column, weight) in weights {
        if !table.has_column(column) {
            warn!(column, "column not found in table");
            continue;
        }
        let share = weight / total;
        for (score, value) in scores.iter_mut().zip(table.numbers(column)?) {
            *score = match (*score, value) {
                (Some(acc), Some(v)) => Some(acc + v * share),
                _ => None,
            };
        }
    }
    Ok(scores
        .into_iter()
        .map(|s| s.map(|s| crate::round_dp(s, 2)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_parse() {
        assert_eq!("MinMax".parse::<NormalizeMethod>(), Ok(NormalizeMethod::MinMax));
        assert_eq!("zscore".parse::<NormalizeMethod>(), Ok(NormalizeMethod::ZScore));
        assert_eq!(
            "robust".parse::<NormalizeMethod>(),
            Err(StatsError::UnknownMethod("robust".to_string()))
        );
    }

    #[test]
    fn sample_sd_needs_two_values() {
        assert_eq!(sample_mean_sd(&[4.0]), None);
        let (mean, sd) = sample_mean_sd(&[2.0, 4.0]).unwrap();
        assert_eq!(mean, 3.0);
        assert!((sd - 2f64.sqrt()).abs() < 1e-12);
    }
}
