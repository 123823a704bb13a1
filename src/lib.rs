pub mod config;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod form;
pub mod logging;
pub mod mart_store;
pub mod metric_table;
pub mod normalize;
pub mod percentiles;
pub mod radar;
pub mod report;
pub mod rolling;
pub mod schedule;
pub mod stat_type;

pub use error::{Result, StatsError};
pub use metric_table::{Cell, Direction, EntityMetrics, MetricTable};

/// Half-away-from-zero rounding to `dp` decimal places.
pub(crate) fn round_dp(v: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (v * factor).round() / factor
}
