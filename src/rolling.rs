use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Result, StatsError};
use crate::metric_table::{CellKey, MetricTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aggregate {
    Mean,
    Sum,
}

/// Nulls are skipped inside the window; fewer than `min_periods`
/// observations yields `None`.
pub fn rolling_mean(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    rolling(values, window, min_periods, Aggregate::Mean)
}

pub fn rolling_sum(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    rolling(values, window, min_periods, Aggregate::Sum)
}

fn rolling(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
    agg: Aggregate,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(StatsError::InvalidWindow(window));
    }
    if min_periods > window {
        return Err(StatsError::MinPeriodsExceedsWindow {
            min_periods,
            window,
        });
    }

    let out = (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = values[start..=i].iter().flatten().copied().collect();
            let count = present.len();
            let sum: f64 = present.iter().sum();
            match agg {
                _ if count < min_periods => None,
                Aggregate::Mean if count == 0 => None,
                Aggregate::Mean => Some(sum / count as f64),
                Aggregate::Sum => Some(sum),
            }
        })
        .collect();
    Ok(out)
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, non-adjusted.
///
/// Seeded with the first observation, then
/// `ewma[i] = alpha * x[i] + (1 - alpha) * ewma[i - 1]`. A null position
/// repeats the previous average and the old weight keeps decaying across it.
pub fn ewma(values: &[Option<f64>], span: f64) -> Result<Vec<Option<f64>>> {
    if !(span >= 1.0) {
        return Err(StatsError::InvalidSpan(span));
    }
    let alpha = 2.0 / (span + 1.0);
    let decay = 1.0 - alpha;

    let mut out = Vec::with_capacity(values.len());
    let mut avg: Option<f64> = None;
    let mut old_weight = 1.0;
    for value in values {
        match (value, avg) {
            (Some(x), None) => {
                avg = Some(*x);
                old_weight = 1.0;
            }
            (Some(x), Some(prev)) => {
                old_weight *= decay;
                avg = Some((old_weight * prev + alpha * x) / (old_weight + alpha));
                old_weight = 1.0;
            }
            (None, Some(_)) => old_weight *= decay,
            (None, None) => {}
        }
        out.push(avg);
    }
    Ok(out)
}

/// Runs `f` on each group's subsequence and scatters results back in place.
pub fn per_group<K, F>(keys: &[K], values: &[Option<f64>], f: F) -> Result<Vec<Option<f64>>>
where
    K: Eq + Hash,
    F: Fn(&[Option<f64>]) -> Result<Vec<Option<f64>>>,
{
    if keys.len() != values.len() {
        return Err(StatsError::GroupLengthMismatch {
            keys: keys.len(),
            values: values.len(),
        });
    }

    let mut groups: HashMap<&K, Vec<usize>> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        groups.entry(key).or_default().push(idx);
    }

    let mut out = vec![None; values.len()];
    for positions in groups.values() {
        let slice: Vec<Option<f64>> = positions.iter().map(|&i| values[i]).collect();
        let computed = f(&slice)?;
        for (&pos, v) in positions.iter().zip(computed) {
            out[pos] = v;
        }
    }
    Ok(out)
}

pub fn rolling_mean_grouped<K: Eq + Hash>(
    keys: &[K],
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    per_group(keys, values, |s| rolling_mean(s, window, min_periods))
}

pub fn rolling_sum_grouped<K: Eq + Hash>(
    keys: &[K],
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    per_group(keys, values, |s| rolling_sum(s, window, min_periods))
}

pub fn ewma_grouped<K: Eq + Hash>(
    keys: &[K],
    values: &[Option<f64>],
    span: f64,
) -> Result<Vec<Option<f64>>> {
    per_group(keys, values, |s| ewma(s, span))
}

/// Rolling mean of a table column, optionally reset per `group_by` value.
pub fn rolling_mean_column(
    table: &MetricTable,
    column: &str,
    window: usize,
    min_periods: usize,
    group_by: Option<&str>,
) -> Result<Vec<Option<f64>>> {
    column_op(table, column, group_by, |s| rolling_mean(s, window, min_periods))
}

pub fn rolling_sum_column(
    table: &MetricTable,
    column: &str,
    window: usize,
    min_periods: usize,
    group_by: Option<&str>,
) -> Result<Vec<Option<f64>>> {
    column_op(table, column, group_by, |s| rolling_sum(s, window, min_periods))
}

pub fn ewma_column(
    table: &MetricTable,
    column: &str,
    span: f64,
    group_by: Option<&str>,
) -> Result<Vec<Option<f64>>> {
    column_op(table, column, group_by, |s| ewma(s, span))
}

fn column_op<F>(
    table: &MetricTable,
    column: &str,
    group_by: Option<&str>,
    f: F,
) -> Result<Vec<Option<f64>>>
where
    F: Fn(&[Option<f64>]) -> Result<Vec<Option<f64>>>,
{
    let values = table.numbers(column)?;
    match group_by {
        Some(group_col) => {
            let keys: Vec<CellKey> = table
                .cells(group_col)?
                .into_iter()
                .map(|c| c.group_key())
                .collect();
            per_group(&keys, &values, f)
        }
        None => f(&values),
    }
}
