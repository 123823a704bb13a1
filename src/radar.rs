use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metric_table::{Direction, EntityMetrics, MetricTable};
use crate::percentiles::LeagueComparison;

const MIDPOINT: f64 = 0.5;

/// Display bound for one radar axis. Always `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub low: f64,
    pub high: f64,
}

impl AxisScale {
    pub const UNIT: AxisScale = AxisScale {
        low: 0.0,
        high: 1.0,
    };

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

pub type ScaleMap = BTreeMap<String, AxisScale>;

/// Per-metric bounds from the population's observed range.
///
/// A constant column is widened by ±10% (or to `[-0.5, 0.5]` when the value
/// is zero or negative). Otherwise the range is padded by `padding_pct` on
/// both ends, with the low end held at zero for non-negative data. Metrics
/// missing from the table, or with no values, get the unit scale.
pub fn radar_scales(population: &MetricTable, metrics: &[&str], padding_pct: f64) -> ScaleMap {
    let mut scales = ScaleMap::new();
    for metric in metrics {
        let Some(values) = population.present_values(metric) else {
            warn!(metric, "metric not found in population");
            scales.insert(metric.to_string(), AxisScale::UNIT);
            continue;
        };
        if values.is_empty() {
            scales.insert(metric.to_string(), AxisScale::UNIT);
            continue;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let (low, high) = if range == 0.0 {
            if min > 0.0 {
                (min * 0.9, max * 1.1)
            } else {
                (-0.5, 0.5)
            }
        } else {
            let padding = range * padding_pct;
            let low = if min >= 0.0 {
                (min - padding).max(0.0)
            } else {
                min - padding
            };
            (low, max + padding)
        };

        let rounded = AxisScale {
            low: crate::round_dp(low, 2),
            high: crate::round_dp(high, 2),
        };
        // Tiny magnitudes can collapse under rounding; keep the raw bound then.
        let scale = if rounded.width() > 0.0 {
            rounded
        } else {
            AxisScale { low, high }
        };
        scales.insert(metric.to_string(), scale);
    }
    scales
}

/// Maps one value into `[0, 1]`; no scale or a zero-width scale gives 0.5.
pub fn normalize_value(value: f64, scale: Option<&AxisScale>) -> f64 {
    let Some(scale) = scale else {
        return MIDPOINT;
    };
    if scale.width() <= 0.0 || value.is_nan() {
        return MIDPOINT;
    }
    let norm = ((value - scale.low) / scale.width()).clamp(0.0, 1.0);
    crate::round_dp(norm, 3)
}

pub fn normalize_for_radar(values: &[f64], scales: &ScaleMap, metrics: &[&str]) -> Vec<f64> {
    values
        .iter()
        .zip(metrics)
        .map(|(value, metric)| normalize_value(*value, scales.get(*metric)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxis {
    pub metric: String,
    pub label: String,
    pub direction: Direction,
    pub team_value: Option<f64>,
    pub league_value: Option<f64>,
    pub team_radius: f64,
    pub league_radius: f64,
}

/// Builds radar axes for the focal entity against the league average.
///
/// Lower-is-better axes are flipped (`1 - r`) so a better performance always
/// plots further out. Missing values sit on the midpoint.
pub fn radar_profile(
    population: &MetricTable,
    entity: &EntityMetrics,
    league: &LeagueComparison,
    axes: &[(&str, &str)],
    padding_pct: f64,
) -> Vec<RadarAxis> {
    let metrics: Vec<&str> = axes.iter().map(|(m, _)| *m).collect();
    let scales = radar_scales(population, &metrics, padding_pct);

    axes.iter()
        .map(|(metric, label)| {
            let direction = population.direction(metric);
            let scale = scales.get(*metric);
            let team_value = entity.number(metric);
            let league_value = league.average(metric);
            let radius = |v: Option<f64>| {
                let r = v.map_or(MIDPOINT, |v| normalize_value(v, scale));
                match direction {
                    Direction::HigherIsBetter => r,
                    Direction::LowerIsBetter => crate::round_dp(1.0 - r, 3),
                }
            };
            RadarAxis {
                metric: metric.to_string(),
                label: label.to_string(),
                direction,
                team_value,
                league_value,
                team_radius: radius(team_value),
                league_radius: radius(league_value),
            }
        })
        .collect()
}
