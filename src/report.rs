use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Result, StatsError};
use crate::form::{self, Outcome, PointsTable, Streak};
use crate::metric_table::{Direction, EntityMetrics, MetricTable};
use crate::percentiles::{self, LeagueComparison};
use crate::radar::{self, RadarAxis};
use crate::stat_type::StatType;

pub const TEAM_ID_COLUMN: &str = "team_id";
pub const TEAM_NAME_COLUMN: &str = "team_name";

/// One metric row of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLine {
    pub metric: String,
    pub direction: Direction,
    pub value: Option<f64>,
    pub league_average: Option<f64>,
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub team_id: i64,
    pub team_name: Option<String>,
    pub stat_type: StatType,
    pub population_size: usize,
    pub metrics: Vec<MetricLine>,
    pub radar: Vec<RadarAxis>,
}

impl TeamReport {
    pub fn line(&self, metric: &str) -> Option<&MetricLine> {
        self.metrics.iter().find(|l| l.metric == metric)
    }
}

/// Builds the report for `team_id` against the rest of `population`.
///
/// The category's default directions are applied on top of any the table
/// already carries.
pub fn build_team_report(
    population: &MetricTable,
    team_id: i64,
    stat_type: StatType,
    config: &EngineConfig,
) -> Result<TeamReport> {
    let population = population.clone().with_directions(stat_type.directions());
    let entity = population
        .find_entity(TEAM_ID_COLUMN, team_id)
        .ok_or(StatsError::EntityNotFound(team_id))?;

    let comparison =
        percentiles::league_stats_and_percentiles(&population, &entity, &config.percentiles);
    let radar = radar::radar_profile(
        &population,
        &entity,
        &comparison,
        stat_type.radar_axes(),
        config.radar_padding_pct,
    );
    debug!(
        team_id,
        stat_type = %stat_type,
        teams = population.len(),
        metrics = comparison.percentiles.len(),
        "built team report"
    );

    Ok(TeamReport {
        team_id,
        team_name: entity
            .get(TEAM_NAME_COLUMN)
            .and_then(|c| c.as_text())
            .map(str::to_string),
        stat_type,
        population_size: population.len(),
        metrics: metric_lines(&population, &entity, &comparison),
        radar,
    })
}

fn metric_lines(
    population: &MetricTable,
    entity: &EntityMetrics,
    comparison: &LeagueComparison,
) -> Vec<MetricLine> {
    population
        .columns()
        .iter()
        .filter(|c| comparison.percentiles.contains_key(*c))
        .map(|metric| MetricLine {
            metric: metric.clone(),
            direction: population.direction(metric),
            value: entity.number(metric),
            league_average: comparison.average(metric),
            percentile: comparison.percentile(metric),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    pub matches: usize,
    pub sequence: String,
    pub score: f64,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub points: f64,
    pub streak: Streak,
}

/// Form over the last `window` results (oldest first in `results`).
pub fn form_summary(results: &[Outcome], window: usize, points: &PointsTable) -> FormSummary {
    let recent = &results[results.len().saturating_sub(window)..];
    FormSummary {
        matches: recent.len(),
        sequence: form::form_sequence(recent, window),
        score: form::form_score(recent, points),
        win_rate: form::outcome_rate(recent, Outcome::Win),
        draw_rate: form::outcome_rate(recent, Outcome::Draw),
        loss_rate: form::outcome_rate(recent, Outcome::Loss),
        points: form::total_points(recent, points),
        streak: form::current_streak(recent),
    }
}
